//! Values that only ever exist in their protected form: the blind index and
//! ciphertext of an email, and the one-way hash of a password or token.

use serde::{Deserialize, Serialize};
use secrecy::{ExposeSecret, Secret};

/// Deterministic keyed digest of a normalized email, hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlindIndex(String);

impl BlindIndex {
    pub fn new(digest_hex: String) -> Self {
        Self(digest_hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Base64 of `nonce || ciphertext || tag`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailCiphertext(String);

impl EmailCiphertext {
    pub fn new(encoded: String) -> Self {
        Self(encoded)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// PHC string produced by the password hasher.
#[derive(Debug, Clone)]
pub struct PasswordHash(Secret<String>);

impl PasswordHash {
    pub fn new(phc: Secret<String>) -> Self {
        Self(phc)
    }
}

impl AsRef<Secret<String>> for PasswordHash {
    fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}

impl PartialEq for PasswordHash {
    fn eq(&self, other: &Self) -> bool {
        self.0.expose_secret() == other.0.expose_secret()
    }
}
