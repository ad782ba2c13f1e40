use std::sync::Arc;

use registra_core::{AuthId, CreateAuthUserCommand, ProfileId, RegistrationData};

use crate::{command_bus::CommandBus, error::CommandError};

/// Ids assigned to a registration. The identity exists when this is
/// returned; the profile follows once the saga converges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationReceipt {
    pub auth_id: AuthId,
    pub profile_id: ProfileId,
}

/// Registration entry point.
///
/// Only the identity step runs inside the caller's request. The profile
/// step is driven asynchronously by the saga, so reading the profile right
/// after `register` returns may still find nothing. Dropping the returned
/// future after the identity event is published does not stop the saga.
#[derive(Clone)]
pub struct RegistrationService {
    command_bus: Arc<CommandBus>,
}

impl RegistrationService {
    pub fn new(command_bus: Arc<CommandBus>) -> Self {
        Self { command_bus }
    }

    #[tracing::instrument(name = "RegistrationService::register", skip_all)]
    pub async fn register(
        &self,
        registration: RegistrationData,
    ) -> Result<RegistrationReceipt, CommandError> {
        let auth_id = AuthId::generate();
        let profile_id = ProfileId::generate();

        self.command_bus
            .dispatch(
                CreateAuthUserCommand::new(registration, auth_id.clone(), profile_id.clone())
                    .into(),
            )
            .await
            .inspect_err(|e| {
                if e.is_rejection() {
                    tracing::info!(error = %e, "Registration rejected");
                } else {
                    tracing::error!(error = %e, "Registration failed");
                }
            })?;

        tracing::info!(%auth_id, %profile_id, "Registration accepted");
        Ok(RegistrationReceipt {
            auth_id,
            profile_id,
        })
    }
}
