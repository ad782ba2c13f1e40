use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        self, PasswordHash as PhcString, PasswordHasher as _, PasswordVerifier, SaltString,
        rand_core,
    },
};
use secrecy::{ExposeSecret, Secret};

use registra_core::{HashingError, Password, PasswordHash, PasswordHasher};

use crate::config::PasswordHashingSettings;

/// Argon2id hashing on the blocking thread pool.
///
/// Each call gets its own blocking task, so concurrent registrations hash in
/// parallel instead of queueing behind one worker.
#[derive(Debug, Clone)]
pub struct Argon2PasswordHasher {
    params: Params,
}

impl Argon2PasswordHasher {
    pub fn new(settings: &PasswordHashingSettings) -> Result<Self, HashingError> {
        let params = Params::new(
            settings.memory_kib,
            settings.iterations,
            settings.parallelism,
            None,
        )
        .map_err(|e| HashingError::Failed(e.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(params: Params) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    }
}

#[async_trait::async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: Password) -> Result<PasswordHash, HashingError> {
        self.hash_token(password.as_ref().clone()).await
    }

    #[tracing::instrument(name = "Computing password hash", skip_all)]
    async fn hash_token(&self, token: Secret<String>) -> Result<PasswordHash, HashingError> {
        let params = self.params.clone();
        let current_span: tracing::Span = tracing::Span::current();

        let result = tokio::task::spawn_blocking(move || {
            current_span.in_scope(move || {
                let salt: SaltString = SaltString::generate(rand_core::OsRng);
                Self::argon2(params)
                    .hash_password(token.expose_secret().as_bytes(), &salt)
                    .map(|h| PasswordHash::new(Secret::new(h.to_string())))
                    .map_err(|e| HashingError::Failed(e.to_string()))
            })
        })
        .await
        .map_err(|e| HashingError::Failed(e.to_string()))?;

        result
    }

    #[tracing::instrument(name = "Verify password hash", skip_all)]
    async fn verify(
        &self,
        expected: &PasswordHash,
        candidate: Secret<String>,
    ) -> Result<bool, HashingError> {
        let params = self.params.clone();
        let expected = expected.as_ref().clone();
        let current_span: tracing::Span = tracing::Span::current();

        let result = tokio::task::spawn_blocking(move || {
            current_span.in_scope(|| {
                let expected_hash = PhcString::new(expected.expose_secret())
                    .map_err(|e| HashingError::Failed(e.to_string()))?;

                match Self::argon2(params)
                    .verify_password(candidate.expose_secret().as_bytes(), &expected_hash)
                {
                    Ok(()) => Ok(true),
                    Err(password_hash::Error::Password) => Ok(false),
                    Err(e) => Err(HashingError::Failed(e.to_string())),
                }
            })
        })
        .await
        .map_err(|e| HashingError::Failed(e.to_string()))?;

        result
    }
}
