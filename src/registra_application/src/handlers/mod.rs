pub mod create_auth_user;
pub mod create_profile;
pub mod delete_auth_user;

use async_trait::async_trait;

use crate::error::CommandError;

/// Handles one command type. The command bus holds exactly one handler per
/// command kind.
#[async_trait]
pub trait CommandHandler<C>: Send + Sync
where
    C: Send + 'static,
{
    async fn handle(&self, command: C) -> Result<(), CommandError>;
}
