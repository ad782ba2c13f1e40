use registra_core::{
    AuthIdentity, AuthStore, AuthStoreError, AuthUserCreatedEvent, CreateAuthUserCommand, Email,
    EmailVault, EventPublisher, Password, PasswordHasher, RegistrationData, ValidationError,
    auth_rules, profile_rules,
};

use crate::{error::CommandError, handlers::CommandHandler};

/// First step of a registration: persists the identity, then announces it.
pub struct CreateAuthUserHandler<A, V, H, P>
where
    A: AuthStore,
    V: EmailVault,
    H: PasswordHasher,
    P: EventPublisher,
{
    auth_store: A,
    vault: V,
    hasher: H,
    publisher: P,
}

impl<A, V, H, P> CreateAuthUserHandler<A, V, H, P>
where
    A: AuthStore,
    V: EmailVault,
    H: PasswordHasher,
    P: EventPublisher,
{
    pub fn new(auth_store: A, vault: V, hasher: H, publisher: P) -> Self {
        Self {
            auth_store,
            vault,
            hasher,
            publisher,
        }
    }

    async fn publish_created(&self, command: &CreateAuthUserCommand) -> Result<(), CommandError> {
        let registration = command.registration();
        let event = AuthUserCreatedEvent::new(
            command.auth_id().clone(),
            command.profile_id().clone(),
            registration.name.clone(),
            registration.lastname.clone(),
            registration.age,
        );
        self.publisher.publish(event.into()).await?;
        tracing::info!("Auth user created, AuthUserCreatedEvent dispatched");
        Ok(())
    }
}

/// Checks credentials and the profile fields carried by the registration,
/// reporting every violation at once.
fn validate_registration(
    registration: &RegistrationData,
) -> Result<(Email, Password), ValidationError> {
    let credentials = auth_rules::validate_credentials(
        registration.email.clone(),
        registration.password.clone(),
    );
    let profile = profile_rules::validate_profile(
        &registration.name,
        &registration.lastname,
        registration.age,
    );

    match (credentials, profile) {
        (Ok(credentials), Ok(_)) => Ok(credentials),
        (Err(err), Ok(_)) | (Ok(_), Err(err)) => Err(err),
        (Err(credentials), Err(profile)) => Err(ValidationError::new(
            credentials
                .violations()
                .iter()
                .chain(profile.violations())
                .cloned()
                .collect(),
        )),
    }
}

#[async_trait::async_trait]
impl<A, V, H, P> CommandHandler<CreateAuthUserCommand> for CreateAuthUserHandler<A, V, H, P>
where
    A: AuthStore,
    V: EmailVault,
    H: PasswordHasher,
    P: EventPublisher,
{
    #[tracing::instrument(
        name = "CreateAuthUserHandler::handle",
        skip_all,
        fields(auth_id = %command.auth_id(), profile_id = %command.profile_id())
    )]
    async fn handle(&self, command: CreateAuthUserCommand) -> Result<(), CommandError> {
        let (email, password) = validate_registration(command.registration()).inspect_err(|e| {
            tracing::info!(error = %e, "Registration rejected");
        })?;

        let blind_index = self.vault.blind_index(&email);
        let existing = self.auth_store.find_by_blind_index(&blind_index).await?;

        // A redelivered command whose write already landed only needs its
        // event sent again; the profile step absorbs the duplicate.
        if let Some(existing) = &existing {
            if &existing.id == command.auth_id() {
                tracing::info!("Identity already persisted, republishing event");
                return self.publish_created(&command).await;
            }
        }

        if !auth_rules::can_create_user(existing.as_ref()) {
            tracing::warn!("Registration failed - email already exists");
            return Err(CommandError::Conflict);
        }

        let password_hash = self.hasher.hash(password).await?;
        let email_ciphertext = self.vault.encrypt(&email)?;
        let identity = AuthIdentity::new(
            command.auth_id().clone(),
            email_ciphertext,
            blind_index,
            password_hash,
        );

        match self.auth_store.create(identity).await {
            Ok(()) => {}
            Err(AuthStoreError::AlreadyExists) => {
                tracing::warn!("Registration lost a race for the same email");
                return Err(CommandError::Conflict);
            }
            Err(e) => return Err(e.into()),
        }

        self.publish_created(&command).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        MockAuthStore, MockHasher, MockVault, RecordingPublisher, registration,
    };
    use registra_core::{AuthId, DomainEvent, ProfileId, Violation};
    use secrecy::{ExposeSecret, Secret};

    fn handler(
        store: &MockAuthStore,
        publisher: &RecordingPublisher,
    ) -> CreateAuthUserHandler<MockAuthStore, MockVault, MockHasher, RecordingPublisher> {
        CreateAuthUserHandler::new(store.clone(), MockVault, MockHasher, publisher.clone())
    }

    fn command(email: &str) -> CreateAuthUserCommand {
        CreateAuthUserCommand::new(registration(email), AuthId::generate(), ProfileId::generate())
    }

    #[tokio::test]
    async fn test_create_auth_user_persists_then_publishes() {
        let store = MockAuthStore::default();
        let publisher = RecordingPublisher::default();
        let command = command("a@b.com");
        let auth_id = command.auth_id().clone();
        let profile_id = command.profile_id().clone();

        handler(&store, &publisher).handle(command).await.unwrap();

        let stored = store.find_by_id(&auth_id).await.unwrap().unwrap();
        assert_eq!(stored.email_ciphertext.as_str(), "enc:a@b.com");
        assert_eq!(stored.email_blind_index.as_str(), "idx:a@b.com");
        assert_eq!(stored.password_hash.as_ref().expose_secret(), "hash:Secret123");

        let events = publisher.published().await;
        assert_eq!(events.len(), 1);
        let DomainEvent::AuthUserCreated(event) = &events[0] else {
            panic!("unexpected event {:?}", events[0]);
        };
        assert_eq!(event.auth_id(), &auth_id);
        assert_eq!(event.profile_id(), &profile_id);
        assert_eq!((event.name(), event.lastname(), event.age()), ("Ann", "Lee", 30));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_a_conflict_without_event() {
        let store = MockAuthStore::default();
        let publisher = RecordingPublisher::default();
        let handler = handler(&store, &publisher);

        handler.handle(command("a@b.com")).await.unwrap();
        let result = handler.handle(command("A@B.com ")).await;

        assert!(matches!(result, Err(CommandError::Conflict)));
        assert_eq!(publisher.published().await.len(), 1);
        assert_eq!(store.live_count().await, 1);
    }

    #[tokio::test]
    async fn test_invalid_input_is_rejected_before_persistence() {
        let store = MockAuthStore::default();
        let publisher = RecordingPublisher::default();
        let mut data = registration("not-an-email");
        data.password = Secret::new("weak".to_string());
        data.age = 200;
        let command = CreateAuthUserCommand::new(data, AuthId::generate(), ProfileId::generate());

        let result = handler(&store, &publisher).handle(command).await;

        let Err(CommandError::Validation(err)) = result else {
            panic!("expected validation error, got {result:?}");
        };
        assert_eq!(
            err.violations(),
            &[
                Violation::InvalidEmail,
                Violation::WeakPassword,
                Violation::AgeOutOfRange(200)
            ]
        );
        assert_eq!(store.live_count().await, 0);
        assert!(publisher.published().await.is_empty());
    }

    #[tokio::test]
    async fn test_redelivered_command_republishes_without_second_write() {
        let store = MockAuthStore::default();
        let publisher = RecordingPublisher::default();
        let handler = handler(&store, &publisher);
        let command = command("a@b.com");

        handler.handle(command.clone()).await.unwrap();
        handler.handle(command).await.unwrap();

        assert_eq!(store.live_count().await, 1);
        assert_eq!(publisher.published().await.len(), 2);
    }
}
