//! Pure rule checks. Nothing here performs I/O or fetches data; callers pass
//! in whatever state a rule needs.

pub mod auth_rules;
pub mod profile_rules;

use std::fmt;

use thiserror::Error;

/// A single broken domain rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("Invalid email format")]
    InvalidEmail,
    #[error(
        "Password must be at least 8 characters and include an uppercase letter, a lowercase letter and a number"
    )]
    WeakPassword,
    #[error("New password must be different from old password")]
    PasswordUnchanged,
    #[error("Name must be at least 2 characters long")]
    NameTooShort,
    #[error("Lastname must be at least 2 characters long")]
    LastnameTooShort,
    #[error("Age must be between 0 and 150, got {0}")]
    AgeOutOfRange(i64),
}

/// Every rule an input broke, in the order they were checked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn contains(&self, violation: &Violation) -> bool {
        self.violations.contains(violation)
    }

    /// `Ok(())` when nothing was violated.
    pub fn check(violations: Vec<Violation>) -> Result<(), Self> {
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Self { violations })
        }
    }
}

impl From<Violation> for ValidationError {
    fn from(violation: Violation) -> Self {
        Self {
            violations: vec![violation],
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.violations.iter().map(ToString::to_string).collect();
        write!(f, "Validation failed: {}", messages.join("; "))
    }
}
