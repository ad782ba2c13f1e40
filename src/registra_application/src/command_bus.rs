use std::sync::Arc;

use registra_core::{Command, CreateAuthUserCommand, CreateProfileCommand, DeleteAuthUserCommand};

use crate::{error::CommandError, handlers::CommandHandler};

/// Routes each command to the single handler registered for its kind.
///
/// The handler set is fixed at construction, one field per command kind, so
/// a missing or duplicate registration cannot exist.
#[derive(Clone)]
pub struct CommandBus {
    create_auth_user: Arc<dyn CommandHandler<CreateAuthUserCommand>>,
    create_profile: Arc<dyn CommandHandler<CreateProfileCommand>>,
    delete_auth_user: Arc<dyn CommandHandler<DeleteAuthUserCommand>>,
}

impl CommandBus {
    pub fn new(
        create_auth_user: impl CommandHandler<CreateAuthUserCommand> + 'static,
        create_profile: impl CommandHandler<CreateProfileCommand> + 'static,
        delete_auth_user: impl CommandHandler<DeleteAuthUserCommand> + 'static,
    ) -> Self {
        Self {
            create_auth_user: Arc::new(create_auth_user),
            create_profile: Arc::new(create_profile),
            delete_auth_user: Arc::new(delete_auth_user),
        }
    }

    #[tracing::instrument(name = "CommandBus::dispatch", skip_all, fields(command = %command.kind()))]
    pub async fn dispatch(&self, command: Command) -> Result<(), CommandError> {
        match command {
            Command::CreateAuthUser(command) => self.create_auth_user.handle(command).await,
            Command::CreateProfile(command) => self.create_profile.handle(command).await,
            Command::DeleteAuthUser(command) => self.delete_auth_user.handle(command).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use registra_core::{AuthId, ProfileId};
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<&'static str>>>);

    #[async_trait::async_trait]
    impl CommandHandler<CreateAuthUserCommand> for Recorder {
        async fn handle(&self, _command: CreateAuthUserCommand) -> Result<(), CommandError> {
            self.0.lock().unwrap().push("create_auth_user");
            Ok(())
        }
    }

    #[async_trait::async_trait]
    impl CommandHandler<CreateProfileCommand> for Recorder {
        async fn handle(&self, _command: CreateProfileCommand) -> Result<(), CommandError> {
            self.0.lock().unwrap().push("create_profile");
            Ok(())
        }
    }

    #[async_trait::async_trait]
    impl CommandHandler<DeleteAuthUserCommand> for Recorder {
        async fn handle(&self, _command: DeleteAuthUserCommand) -> Result<(), CommandError> {
            self.0.lock().unwrap().push("delete_auth_user");
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_each_command_reaches_its_handler_once() {
        let recorder = Recorder::default();
        let bus = CommandBus::new(recorder.clone(), recorder.clone(), recorder.clone());

        bus.dispatch(
            DeleteAuthUserCommand::new(AuthId::from("auth-1"), ProfileId::from("profile-1"))
                .into(),
        )
        .await
        .unwrap();
        bus.dispatch(
            CreateProfileCommand::new(
                ProfileId::from("profile-1"),
                AuthId::from("auth-1"),
                "Ann".into(),
                "Lee".into(),
                30,
            )
            .into(),
        )
        .await
        .unwrap();

        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec!["delete_auth_user", "create_profile"]
        );
    }
}
