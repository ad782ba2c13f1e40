use crate::{
    domain::{
        ids::AuthId,
        profile::{Profile, ProfileUpdate},
    },
    validation::{ValidationError, Violation},
};

pub const MIN_AGE: i64 = 0;
pub const MAX_AGE: i64 = 150;
const MIN_NAME_LENGTH: usize = 2;

pub fn validate_age(age: i64) -> Result<u8, Violation> {
    if (MIN_AGE..=MAX_AGE).contains(&age) {
        // MAX_AGE fits in a u8
        Ok(age as u8)
    } else {
        Err(Violation::AgeOutOfRange(age))
    }
}

pub fn validate_name(name: &str) -> Result<(), Violation> {
    if name.trim().chars().count() < MIN_NAME_LENGTH {
        return Err(Violation::NameTooShort);
    }
    Ok(())
}

pub fn validate_lastname(lastname: &str) -> Result<(), Violation> {
    if lastname.trim().chars().count() < MIN_NAME_LENGTH {
        return Err(Violation::LastnameTooShort);
    }
    Ok(())
}

/// Validates all profile fields, returning the age narrowed to its stored
/// width.
pub fn validate_profile(name: &str, lastname: &str, age: i64) -> Result<u8, ValidationError> {
    let checked_age = validate_age(age);
    let violations: Vec<Violation> = [
        validate_name(name).err(),
        validate_lastname(lastname).err(),
        checked_age.as_ref().err().cloned(),
    ]
    .into_iter()
    .flatten()
    .collect();
    ValidationError::check(violations)?;

    Ok(checked_age?)
}

pub fn validate_profile_update(update: &ProfileUpdate) -> Result<(), ValidationError> {
    let mut violations = Vec::new();
    if let Some(name) = &update.name {
        violations.extend(validate_name(name).err());
    }
    if let Some(lastname) = &update.lastname {
        violations.extend(validate_lastname(lastname).err());
    }
    if let Some(age) = update.age {
        violations.extend(validate_age(i64::from(age)).err());
    }
    ValidationError::check(violations)
}

pub fn can_create_profile(existing: Option<&Profile>) -> bool {
    existing.is_none()
}

pub fn can_update_profile(profile: &Profile, requesting_auth_id: &AuthId, is_admin: bool) -> bool {
    &profile.auth_id == requesting_auth_id || is_admin
}
