use secrecy::{ExposeSecret, Secret};

use crate::{
    domain::{auth_identity::AuthIdentity, email::Email, password::Password, role::Role},
    validation::{ValidationError, Violation},
};

pub fn can_create_user(existing: Option<&AuthIdentity>) -> bool {
    existing.is_none()
}

pub fn is_email_valid(email: &str) -> bool {
    Email::is_valid(email)
}

pub fn is_password_valid(password: &str) -> bool {
    Password::is_strong(password)
}

/// Checks both credentials and reports every violation at once.
pub fn validate_credentials(
    email: Secret<String>,
    password: Secret<String>,
) -> Result<(Email, Password), ValidationError> {
    match (Email::try_from(email), Password::try_from(password)) {
        (Ok(email), Ok(password)) => Ok((email, password)),
        (Err(violation), Ok(_)) | (Ok(_), Err(violation)) => Err(violation.into()),
        (Err(email), Err(password)) => Err(ValidationError::new(vec![email, password])),
    }
}

pub fn validate_password_change(
    old_password: &Secret<String>,
    new_password: Secret<String>,
) -> Result<Password, ValidationError> {
    let mut violations = Vec::new();
    if !Password::is_strong(new_password.expose_secret()) {
        violations.push(Violation::WeakPassword);
    }
    if old_password.expose_secret() == new_password.expose_secret() {
        violations.push(Violation::PasswordUnchanged);
    }
    ValidationError::check(violations)?;

    Ok(Password::try_from(new_password)?)
}

pub fn can_perform_admin_actions(identity: &AuthIdentity) -> bool {
    identity.has_role(Role::Admin)
}
