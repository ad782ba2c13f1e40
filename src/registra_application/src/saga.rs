use std::sync::Arc;

use registra_core::{
    Command, CreateProfileCommand, DeleteAuthUserCommand, DomainEvent, EventSubscriber, EventType,
    SubscriberError,
};

use crate::command_bus::CommandBus;

/// Process manager of the registration flow.
///
/// A pure event to command mapping: no I/O, no state. All state lives in
/// the two aggregate stores, and every handler it drives is idempotent, so
/// duplicate events are harmless.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistrationSaga;

impl RegistrationSaga {
    /// Event types the saga must be subscribed to.
    pub const SUBSCRIPTIONS: [EventType; 2] =
        [EventType::AuthUserCreated, EventType::ProfileCreationFailed];

    pub fn decide(&self, event: &DomainEvent) -> Command {
        match event {
            DomainEvent::AuthUserCreated(event) => {
                tracing::info!(
                    auth_id = %event.auth_id(),
                    "Saga continues: AuthUserCreated -> CreateProfile"
                );
                CreateProfileCommand::new(
                    event.profile_id().clone(),
                    event.auth_id().clone(),
                    event.name().to_owned(),
                    event.lastname().to_owned(),
                    event.age(),
                )
                .into()
            }
            DomainEvent::ProfileCreationFailed(event) => {
                tracing::warn!(
                    auth_id = %event.auth_id(),
                    reason = event.reason(),
                    "Saga compensates: ProfileCreationFailed -> DeleteAuthUser"
                );
                DeleteAuthUserCommand::new(event.auth_id().clone(), event.profile_id().clone())
                    .into()
            }
        }
    }
}

/// Connects the saga to the event bus: decides, then dispatches.
pub struct SagaSubscriber {
    saga: RegistrationSaga,
    command_bus: Arc<CommandBus>,
}

impl SagaSubscriber {
    pub fn new(command_bus: Arc<CommandBus>) -> Self {
        Self {
            saga: RegistrationSaga,
            command_bus,
        }
    }
}

#[async_trait::async_trait]
impl EventSubscriber for SagaSubscriber {
    fn name(&self) -> &'static str {
        "RegistrationSaga"
    }

    async fn handle(&self, event: DomainEvent) -> Result<(), SubscriberError> {
        let command = self.saga.decide(&event);
        self.command_bus
            .dispatch(command)
            .await
            .map_err(|e| SubscriberError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use registra_core::{AuthId, AuthUserCreatedEvent, ProfileCreationFailedEvent, ProfileId};

    #[test]
    fn test_created_identity_maps_to_profile_creation() {
        let event = AuthUserCreatedEvent::new(
            AuthId::from("auth-1"),
            ProfileId::from("profile-1"),
            "Ann".into(),
            "Lee".into(),
            30,
        );

        let Command::CreateProfile(command) = RegistrationSaga.decide(&event.into()) else {
            panic!("expected CreateProfile");
        };
        assert_eq!(
            command,
            CreateProfileCommand::new(
                ProfileId::from("profile-1"),
                AuthId::from("auth-1"),
                "Ann".into(),
                "Lee".into(),
                30
            )
        );
    }

    #[test]
    fn test_failed_profile_maps_to_compensation() {
        let event = ProfileCreationFailedEvent::new(
            AuthId::from("auth-1"),
            ProfileId::from("profile-1"),
            "boom",
        );

        let Command::DeleteAuthUser(command) = RegistrationSaga.decide(&event.into()) else {
            panic!("expected DeleteAuthUser");
        };
        assert_eq!(
            command,
            DeleteAuthUserCommand::new(AuthId::from("auth-1"), ProfileId::from("profile-1"))
        );
    }

    #[test]
    fn test_decisions_are_deterministic() {
        let event: DomainEvent = ProfileCreationFailedEvent::new(
            AuthId::from("auth-1"),
            ProfileId::from("profile-1"),
            "boom",
        )
        .into();
        let first = RegistrationSaga.decide(&event);
        let second = RegistrationSaga.decide(&event);
        assert_eq!(first.kind(), second.kind());
    }
}
