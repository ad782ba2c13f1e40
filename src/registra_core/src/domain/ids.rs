use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

const AUTH_ID_PREFIX: &str = "auth-";
const PROFILE_ID_PREFIX: &str = "profile-";

/// Identifier of an [`AuthIdentity`](crate::AuthIdentity).
///
/// Generated ids are `auth-` followed by a random v4 UUID. Uniqueness is
/// statistical; nothing outside the generator enforces it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthId(String);

impl AuthId {
    pub fn generate() -> Self {
        Self(format!("{AUTH_ID_PREFIX}{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier of a [`Profile`](crate::Profile), `profile-` plus a v4 UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(String);

impl ProfileId {
    pub fn generate() -> Self {
        Self(format!("{PROFILE_ID_PREFIX}{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Ids read back from storage are trusted as-is.
impl From<String> for AuthId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for AuthId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for ProfileId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ProfileId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl AsRef<str> for AuthId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ProfileId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuthId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
