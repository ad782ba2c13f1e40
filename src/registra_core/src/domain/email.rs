use std::hash::Hash;
use std::sync::LazyLock;

use regex::Regex;
use secrecy::{ExposeSecret, Secret};

use crate::validation::Violation;

static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// A login identifier with a `local@domain.tld` shape.
///
/// The plaintext stays wrapped in a [`Secret`] so it never lands in logs; it
/// is only persisted through the email vault.
#[derive(Debug, Clone)]
pub struct Email(Secret<String>);

impl Email {
    pub fn is_valid(candidate: &str) -> bool {
        EMAIL_SHAPE.is_match(candidate)
    }

    /// Trimmed, lowercased form. Input of the blind index, so that lookups
    /// are insensitive to casing the user typed.
    pub fn normalized(&self) -> String {
        self.0.expose_secret().trim().to_lowercase()
    }
}

impl TryFrom<Secret<String>> for Email {
    type Error = Violation;

    fn try_from(value: Secret<String>) -> Result<Self, Self::Error> {
        let trimmed = value.expose_secret().trim();
        if Self::is_valid(trimmed) {
            Ok(Self(Secret::new(trimmed.to_owned())))
        } else {
            Err(Violation::InvalidEmail)
        }
    }
}

impl AsRef<Secret<String>> for Email {
    fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}

impl PartialEq for Email {
    fn eq(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl Eq for Email {}

impl Hash for Email {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.normalized().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn secret(s: &str) -> Secret<String> {
        Secret::new(s.to_string())
    }

    #[test]
    fn accepts_standard_addresses() {
        for email in ["a@b.com", "ann.lee+tag@mail.example.org", "  x@y.io "] {
            assert!(Email::try_from(secret(email)).is_ok(), "{email}");
        }
    }

    #[test]
    fn rejects_malformed_addresses() {
        for email in ["", "plain", "@b.com", "a@", "a@b", "a b@c.com", "a@@b.com"] {
            assert_eq!(
                Email::try_from(secret(email)).unwrap_err(),
                Violation::InvalidEmail,
                "{email}"
            );
        }
    }

    #[test]
    fn normalization_trims_and_lowercases() {
        let email = Email::try_from(secret("  Ann.Lee@Example.COM ")).unwrap();
        assert_eq!(email.normalized(), "ann.lee@example.com");
        assert_eq!(email, Email::try_from(secret("ann.lee@example.com")).unwrap());
    }

    #[test]
    fn normalization_folds_non_ascii_letters() {
        let upper = Email::try_from(secret("Änn@Straße.DE")).unwrap();
        let lower = Email::try_from(secret("änn@straße.de")).unwrap();
        assert_eq!(upper.normalized(), "änn@straße.de");
        assert_eq!(upper, lower);
    }

    #[quickcheck]
    fn strings_without_at_sign_are_rejected(candidate: String) -> bool {
        candidate.contains('@') || Email::try_from(Secret::new(candidate)).is_err()
    }
}
