use registra_core::{AuthStore, DeleteAuthUserCommand, ProfileStore};

use crate::{error::CommandError, handlers::CommandHandler};

/// Compensating step: removes the identity (and a partially created profile)
/// of a registration that could not complete.
///
/// Idempotent. Running it for an identity that is already gone succeeds.
pub struct DeleteAuthUserHandler<A, S>
where
    A: AuthStore,
    S: ProfileStore,
{
    auth_store: A,
    profile_store: S,
}

impl<A, S> DeleteAuthUserHandler<A, S>
where
    A: AuthStore,
    S: ProfileStore,
{
    pub fn new(auth_store: A, profile_store: S) -> Self {
        Self {
            auth_store,
            profile_store,
        }
    }

    async fn compensate(&self, command: &DeleteAuthUserCommand) -> Result<(), CommandError> {
        let profile = match self.profile_store.find_by_id(command.profile_id()).await? {
            Some(profile) if &profile.auth_id == command.auth_id() => Some(profile),
            _ => self.profile_store.find_by_auth_id(command.auth_id()).await?,
        };
        if let Some(profile) = profile {
            self.profile_store.soft_delete(&profile.id).await?;
            tracing::info!(profile_id = %profile.id, "Partially created profile removed");
        }
        // A redelivered identity event may still be queued behind this command
        self.profile_store
            .tombstone(command.profile_id(), command.auth_id())
            .await?;

        if self.auth_store.soft_delete(command.auth_id()).await? {
            tracing::info!("Identity removed");
        } else {
            tracing::info!("Identity already removed, nothing to compensate");
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl<A, S> CommandHandler<DeleteAuthUserCommand> for DeleteAuthUserHandler<A, S>
where
    A: AuthStore,
    S: ProfileStore,
{
    #[tracing::instrument(
        name = "DeleteAuthUserHandler::handle",
        skip_all,
        fields(auth_id = %command.auth_id(), profile_id = %command.profile_id())
    )]
    async fn handle(&self, command: DeleteAuthUserCommand) -> Result<(), CommandError> {
        self.compensate(&command).await.map_err(|err| {
            tracing::error!(error = %err, "Compensation failed, manual intervention required");
            CommandError::Compensation {
                auth_id: command.auth_id().clone(),
                reason: err.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::create_profile::CreateProfileHandler;
    use crate::test_support::{MockAuthStore, MockProfileStore, RecordingPublisher};
    use registra_core::{
        AuthId, AuthIdentity, BlindIndex, CreateProfileCommand, EmailCiphertext, PasswordHash,
        Profile, ProfileId,
    };
    use secrecy::Secret;
    use std::sync::atomic::Ordering;

    fn identity(id: &str) -> AuthIdentity {
        AuthIdentity::new(
            AuthId::from(id),
            EmailCiphertext::new("enc:a@b.com".into()),
            BlindIndex::new("idx:a@b.com".into()),
            PasswordHash::new(Secret::new("hash".to_string())),
        )
    }

    fn command() -> DeleteAuthUserCommand {
        DeleteAuthUserCommand::new(AuthId::from("auth-1"), ProfileId::from("profile-1"))
    }

    #[tokio::test]
    async fn test_removes_identity_and_partial_profile() {
        let auth_store = MockAuthStore::default();
        let profile_store = MockProfileStore::default();
        auth_store.create(identity("auth-1")).await.unwrap();
        profile_store
            .create(Profile::new(
                ProfileId::from("profile-1"),
                AuthId::from("auth-1"),
                "Ann".into(),
                "Lee".into(),
                30,
            ))
            .await
            .unwrap();
        let handler = DeleteAuthUserHandler::new(auth_store.clone(), profile_store.clone());

        handler.handle(command()).await.unwrap();

        let auth_id = AuthId::from("auth-1");
        assert!(auth_store.find_by_id(&auth_id).await.unwrap().is_none());
        assert!(
            auth_store
                .find_by_blind_index(&BlindIndex::new("idx:a@b.com".into()))
                .await
                .unwrap()
                .is_none()
        );
        assert!(profile_store.find_by_auth_id(&auth_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_repeated_compensation_is_a_no_op() {
        let auth_store = MockAuthStore::default();
        auth_store.create(identity("auth-1")).await.unwrap();
        let handler = DeleteAuthUserHandler::new(auth_store.clone(), MockProfileStore::default());

        handler.handle(command()).await.unwrap();
        handler.handle(command()).await.unwrap();
        assert_eq!(auth_store.live_count().await, 0);
    }

    #[tokio::test]
    async fn test_profile_step_arriving_after_compensation_is_absorbed() {
        let auth_store = MockAuthStore::default();
        let profile_store = MockProfileStore::default();
        auth_store.create(identity("auth-1")).await.unwrap();
        DeleteAuthUserHandler::new(auth_store, profile_store.clone())
            .handle(command())
            .await
            .unwrap();

        let publisher = RecordingPublisher::default();
        let late = CreateProfileCommand::new(
            ProfileId::from("profile-1"),
            AuthId::from("auth-1"),
            "Ann".into(),
            "Lee".into(),
            30,
        );
        CreateProfileHandler::new(profile_store.clone(), publisher.clone())
            .handle(late)
            .await
            .unwrap();

        assert!(profile_store.find_all().await.unwrap().is_empty());
        assert!(publisher.published().await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_identity_succeeds() {
        let handler =
            DeleteAuthUserHandler::new(MockAuthStore::default(), MockProfileStore::default());
        assert!(handler.handle(command()).await.is_ok());
    }

    #[tokio::test]
    async fn test_store_failure_is_a_compensation_error() {
        let auth_store = MockAuthStore::default();
        auth_store.create(identity("auth-1")).await.unwrap();
        auth_store.fail_deletes.store(true, Ordering::SeqCst);
        let handler = DeleteAuthUserHandler::new(auth_store, MockProfileStore::default());

        let result = handler.handle(command()).await;
        assert!(matches!(
            result,
            Err(CommandError::Compensation { auth_id, .. }) if auth_id == AuthId::from("auth-1")
        ));
    }
}
