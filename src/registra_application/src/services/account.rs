use chrono::Utc;
use secrecy::Secret;

use registra_core::{
    AuthId, AuthIdentity, AuthIdentityUpdate, AuthStore, AuthStoreError, DecryptionError, Email,
    EmailVault, HashingError, PasswordHasher, ValidationError, auth_rules,
};

/// Error types for account operations
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Identity not found")]
    NotFound,
    #[error("Refresh token revoked")]
    RefreshTokenRevoked,
    #[error("Auth store error: {0}")]
    AuthStore(#[from] AuthStoreError),
    #[error("Password hashing error: {0}")]
    Hashing(#[from] HashingError),
    #[error("Stored email is unreadable: {0}")]
    Decryption(#[from] DecryptionError),
}

// A write against a missing or deleted identity is the caller's mistake.
fn store_error(error: AuthStoreError) -> AccountError {
    match error {
        AuthStoreError::NotFound => AccountError::NotFound,
        other => AccountError::AuthStore(other),
    }
}

/// Operations on an existing identity: credential checks, password changes
/// and refresh-token bookkeeping. Token issuance itself lives elsewhere.
pub struct AccountService<A, V, H>
where
    A: AuthStore,
    V: EmailVault,
    H: PasswordHasher,
{
    auth_store: A,
    vault: V,
    hasher: H,
}

impl<A, V, H> AccountService<A, V, H>
where
    A: AuthStore,
    V: EmailVault,
    H: PasswordHasher,
{
    pub fn new(auth_store: A, vault: V, hasher: H) -> Self {
        Self {
            auth_store,
            vault,
            hasher,
        }
    }

    async fn live_identity(&self, auth_id: &AuthId) -> Result<AuthIdentity, AccountError> {
        self.auth_store
            .find_by_id(auth_id)
            .await?
            .ok_or(AccountError::NotFound)
    }

    /// Verifies credentials and records the login time.
    ///
    /// Unknown email and wrong password are reported identically.
    #[tracing::instrument(name = "AccountService::authenticate", skip_all)]
    pub async fn authenticate(
        &self,
        email: Secret<String>,
        password: Secret<String>,
    ) -> Result<AuthIdentity, AccountError> {
        let email = Email::try_from(email).map_err(|_| AccountError::InvalidCredentials)?;
        let blind_index = self.vault.blind_index(&email);

        let Some(identity) = self.auth_store.find_by_blind_index(&blind_index).await? else {
            tracing::info!("Login for unknown email");
            return Err(AccountError::InvalidCredentials);
        };

        if !self.hasher.verify(&identity.password_hash, password).await? {
            tracing::warn!(auth_id = %identity.id, "Failed login attempt");
            return Err(AccountError::InvalidCredentials);
        }

        let update = AuthIdentityUpdate {
            last_login_at: Some(Utc::now()),
            ..Default::default()
        };
        self.auth_store
            .update(&identity.id, update)
            .await
            .map_err(store_error)
    }

    /// Replaces the password after checking the old one. Outstanding refresh
    /// tokens are revoked.
    #[tracing::instrument(name = "AccountService::change_password", skip(self, old_password, new_password))]
    pub async fn change_password(
        &self,
        auth_id: &AuthId,
        old_password: Secret<String>,
        new_password: Secret<String>,
    ) -> Result<(), AccountError> {
        let new_password = auth_rules::validate_password_change(&old_password, new_password)?;
        let identity = self.live_identity(auth_id).await?;

        if !self.hasher.verify(&identity.password_hash, old_password).await? {
            return Err(AccountError::InvalidCredentials);
        }

        let update = AuthIdentityUpdate {
            password_hash: Some(self.hasher.hash(new_password).await?),
            refresh_token_hash: Some(None),
            ..Default::default()
        };
        self.auth_store
            .update(auth_id, update)
            .await
            .map_err(store_error)?;
        tracing::info!("Password changed");
        Ok(())
    }

    /// Stores the hash of a newly issued refresh token, replacing the
    /// previous one.
    #[tracing::instrument(name = "AccountService::rotate_refresh_token", skip(self, token))]
    pub async fn rotate_refresh_token(
        &self,
        auth_id: &AuthId,
        token: Secret<String>,
    ) -> Result<(), AccountError> {
        let update = AuthIdentityUpdate {
            refresh_token_hash: Some(Some(self.hasher.hash_token(token).await?)),
            ..Default::default()
        };
        self.auth_store
            .update(auth_id, update)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    #[tracing::instrument(name = "AccountService::verify_refresh_token", skip(self, token))]
    pub async fn verify_refresh_token(
        &self,
        auth_id: &AuthId,
        token: Secret<String>,
    ) -> Result<(), AccountError> {
        let identity = self.live_identity(auth_id).await?;
        let Some(expected) = &identity.refresh_token_hash else {
            return Err(AccountError::RefreshTokenRevoked);
        };

        if self.hasher.verify(expected, token).await? {
            Ok(())
        } else {
            Err(AccountError::InvalidCredentials)
        }
    }

    #[tracing::instrument(name = "AccountService::logout", skip(self))]
    pub async fn logout(&self, auth_id: &AuthId) -> Result<(), AccountError> {
        self.auth_store
            .clear_refresh_token(auth_id)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    pub async fn find_by_id(&self, auth_id: &AuthId) -> Result<Option<AuthIdentity>, AccountError> {
        Ok(self.auth_store.find_by_id(auth_id).await?)
    }

    /// Decrypts the stored email. Corrupted ciphertext surfaces as
    /// [`AccountError::Decryption`].
    #[tracing::instrument(name = "AccountService::email_of", skip(self))]
    pub async fn email_of(&self, auth_id: &AuthId) -> Result<Email, AccountError> {
        let identity = self.live_identity(auth_id).await?;
        Ok(self.vault.decrypt(&identity.email_ciphertext)?)
    }
}
