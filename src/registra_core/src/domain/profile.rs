use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::{AuthId, ProfileId};

/// The profile aggregate, correlated to its identity by `auth_id`.
///
/// One live profile per `auth_id` is only eventually true: the profile is
/// written by the registration saga after the identity already exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub auth_id: AuthId,
    pub name: String,
    pub lastname: String,
    pub age: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Profile {
    pub fn new(id: ProfileId, auth_id: AuthId, name: String, lastname: String, age: u8) -> Self {
        let now = Utc::now();
        Self {
            id,
            auth_id,
            name,
            lastname,
            age,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(lastname) = update.lastname {
            self.lastname = lastname;
        }
        if let Some(age) = update.age {
            self.age = age;
        }
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub lastname: Option<String>,
    pub age: Option<u8>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.lastname.is_none() && self.age.is_none()
    }
}
