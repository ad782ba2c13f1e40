use async_trait::async_trait;
use secrecy::Secret;
use thiserror::Error;

use crate::domain::{
    email::Email,
    password::Password,
    sealed::{BlindIndex, EmailCiphertext, PasswordHash},
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VaultError {
    #[error("Invalid key material: {0}")]
    InvalidKey(String),
    #[error("Encryption failed")]
    EncryptionFailed,
}

/// Stored ciphertext could not be turned back into an email. Never masked by
/// handing back the raw ciphertext.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecryptionError {
    #[error("Ciphertext is not valid base64")]
    MalformedEncoding,
    #[error("Ciphertext is truncated ({0} bytes)")]
    Truncated(usize),
    #[error("Ciphertext failed authentication")]
    Tampered,
    #[error("Decrypted payload is not a valid email")]
    InvalidPlaintext,
}

/// Keeps emails confidential at rest while still allowing exact-match
/// lookup. Pure CPU work, called inline on the write path.
pub trait EmailVault: Send + Sync {
    /// Deterministic: equal normalized emails always yield the same index.
    fn blind_index(&self, email: &Email) -> BlindIndex;
    /// Non-deterministic: a fresh nonce per call.
    fn encrypt(&self, email: &Email) -> Result<EmailCiphertext, VaultError>;
    fn decrypt(&self, ciphertext: &EmailCiphertext) -> Result<Email, DecryptionError>;
}

#[derive(Debug, Error)]
pub enum HashingError {
    #[error("Hashing failed: {0}")]
    Failed(String),
}

/// One-way, salted, adaptive hashing for passwords and refresh tokens.
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, password: Password) -> Result<PasswordHash, HashingError>;
    async fn hash_token(&self, token: Secret<String>) -> Result<PasswordHash, HashingError>;
    async fn verify(
        &self,
        expected: &PasswordHash,
        candidate: Secret<String>,
    ) -> Result<bool, HashingError>;
}
