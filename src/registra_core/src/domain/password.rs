use secrecy::{ExposeSecret, Secret};

use crate::validation::Violation;

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// A plaintext password that satisfies the strength rule: at least
/// [`MIN_PASSWORD_LENGTH`] characters with an uppercase letter, a lowercase
/// letter and a digit.
#[derive(Debug, Clone)]
pub struct Password(Secret<String>);

impl Password {
    pub fn is_strong(candidate: &str) -> bool {
        candidate.chars().count() >= MIN_PASSWORD_LENGTH
            && candidate.chars().any(|c| c.is_uppercase())
            && candidate.chars().any(|c| c.is_lowercase())
            && candidate.chars().any(|c| c.is_ascii_digit())
    }
}

impl TryFrom<Secret<String>> for Password {
    type Error = Violation;

    fn try_from(value: Secret<String>) -> Result<Self, Self::Error> {
        if Self::is_strong(value.expose_secret()) {
            Ok(Self(value))
        } else {
            Err(Violation::WeakPassword)
        }
    }
}

impl AsRef<Secret<String>> for Password {
    fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}

impl PartialEq for Password {
    fn eq(&self, other: &Self) -> bool {
        self.0.expose_secret() == other.0.expose_secret()
    }
}
