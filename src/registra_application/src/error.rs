use registra_core::{
    AuthId, AuthStoreError, EventBusError, HashingError, ProfileStoreError, ValidationError,
    VaultError,
};

/// Error types shared by every command handler
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("An account with this email already exists")]
    Conflict,
    #[error("Auth store error: {0}")]
    AuthStore(#[from] AuthStoreError),
    #[error("Profile store error: {0}")]
    ProfileStore(#[from] ProfileStoreError),
    #[error("Password hashing error: {0}")]
    Hashing(#[from] HashingError),
    #[error("Email vault error: {0}")]
    Vault(#[from] VaultError),
    #[error("Event bus error: {0}")]
    EventBus(#[from] EventBusError),
    #[error("Compensation failed for {auth_id}: {reason}")]
    Compensation { auth_id: AuthId, reason: String },
}

impl CommandError {
    /// Errors the caller caused, as opposed to infrastructure failures.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Conflict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_errors_are_rejections() {
        assert!(CommandError::Conflict.is_rejection());
        assert!(CommandError::Validation(ValidationError::new(Vec::new())).is_rejection());
        assert!(!CommandError::EventBus(EventBusError::Closed).is_rejection());
        assert!(
            !CommandError::AuthStore(AuthStoreError::UnexpectedError("down".into())).is_rejection()
        );
    }
}
