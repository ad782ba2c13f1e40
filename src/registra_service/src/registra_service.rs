use std::sync::Arc;

use registra_adapters::{
    AesGcmEmailVault, Argon2PasswordHasher, DeadLetterQueue, DispatcherHandle, HashMapAuthStore,
    HashMapProfileStore, InMemoryEventBus, PostgresAuthStore, PostgresProfileStore,
    config::RegistraSettings,
};
use registra_application::{
    AccountService, CommandBus, CommandError, CreateAuthUserHandler, CreateProfileHandler,
    DeleteAuthUserHandler, ProfileService, RegistrationReceipt, RegistrationSaga,
    RegistrationService, SagaSubscriber,
};
use registra_core::{AuthStore, EventSubscriber, ProfileStore, RegistrationData};

use crate::{ServiceError, helpers::configure_postgresql};

/// Account service backed by the production vault and hasher.
pub type Accounts<A> = AccountService<A, AesGcmEmailVault, Argon2PasswordHasher>;

/// The assembled registration system: stores, vault, hasher, both buses and
/// the saga, wired once at startup.
///
/// Construction spawns the event dispatcher, so it must happen inside a
/// Tokio runtime. Dropping the service stops the dispatcher.
pub struct RegistraService<A, S>
where
    A: AuthStore + Clone + 'static,
    S: ProfileStore + Clone + 'static,
{
    registration: RegistrationService,
    accounts: Accounts<A>,
    profiles: ProfileService<S>,
    event_bus: InMemoryEventBus,
    dead_letters: DeadLetterQueue,
    dispatcher: DispatcherHandle,
}

impl RegistraService<HashMapAuthStore, HashMapProfileStore> {
    /// Wires the service on the in-memory stores.
    pub fn in_memory(settings: &RegistraSettings) -> Result<Self, ServiceError> {
        let auth_store = HashMapAuthStore::new();
        let profile_store = HashMapProfileStore::new(auth_store.clone());
        Self::new(auth_store, profile_store, settings)
    }
}

impl RegistraService<PostgresAuthStore, PostgresProfileStore> {
    /// Connects to PostgreSQL, applies migrations and wires the service on it.
    pub async fn postgres(settings: &RegistraSettings) -> Result<Self, ServiceError> {
        let postgres = settings
            .postgres
            .as_ref()
            .ok_or(ServiceError::MissingPostgresSettings)?;
        let pool = configure_postgresql(postgres).await?;

        Self::new(
            PostgresAuthStore::new(pool.clone()),
            PostgresProfileStore::new(pool),
            settings,
        )
    }
}

impl<A, S> RegistraService<A, S>
where
    A: AuthStore + Clone + 'static,
    S: ProfileStore + Clone + 'static,
{
    #[tracing::instrument(name = "RegistraService::new", skip_all)]
    pub fn new(auth_store: A, profile_store: S, settings: &RegistraSettings) -> Result<Self, ServiceError> {
        let vault = AesGcmEmailVault::from_settings(&settings.crypto)?;
        let hasher = Argon2PasswordHasher::new(&settings.password_hashing)?;

        // Handlers publish to the bus, the saga dispatches to the handlers:
        // the publisher exists first, subscriptions close the loop.
        let (event_bus, dispatcher) = InMemoryEventBus::channel(&settings.event_bus);

        let command_bus = Arc::new(CommandBus::new(
            CreateAuthUserHandler::new(
                auth_store.clone(),
                vault.clone(),
                hasher.clone(),
                event_bus.clone(),
            ),
            CreateProfileHandler::new(profile_store.clone(), event_bus.clone()),
            DeleteAuthUserHandler::new(auth_store.clone(), profile_store.clone()),
        ));

        let saga: Arc<dyn EventSubscriber> = Arc::new(SagaSubscriber::new(command_bus.clone()));
        let dispatcher = RegistrationSaga::SUBSCRIPTIONS
            .into_iter()
            .fold(dispatcher, |dispatcher, event_type| {
                dispatcher.subscribe(event_type, saga.clone())
            });
        let dead_letters = dispatcher.dead_letters();

        tracing::info!(
            max_delivery_attempts = settings.event_bus.max_delivery_attempts,
            "Registration saga wired"
        );

        Ok(Self {
            registration: RegistrationService::new(command_bus),
            accounts: AccountService::new(auth_store, vault, hasher),
            profiles: ProfileService::new(profile_store),
            event_bus,
            dead_letters,
            dispatcher: dispatcher.spawn(),
        })
    }

    /// Shorthand for [`RegistrationService::register`].
    pub async fn register(
        &self,
        registration: RegistrationData,
    ) -> Result<RegistrationReceipt, CommandError> {
        self.registration.register(registration).await
    }

    pub fn registration(&self) -> &RegistrationService {
        &self.registration
    }

    pub fn accounts(&self) -> &Accounts<A> {
        &self.accounts
    }

    pub fn profiles(&self) -> &ProfileService<S> {
        &self.profiles
    }

    /// Waits until the saga has nothing left in flight.
    pub async fn settled(&self) {
        self.event_bus.settled().await
    }

    pub fn dead_letters(&self) -> &DeadLetterQueue {
        &self.dead_letters
    }

    pub fn is_running(&self) -> bool {
        self.dispatcher.is_running()
    }
}
