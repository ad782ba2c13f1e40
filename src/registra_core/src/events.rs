//! Domain events. Built once by the handler that observed the fact and
//! never mutated afterwards, so fields are private and exposed by getters.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::ids::{AuthId, ProfileId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    AuthUserCreated,
    ProfileCreationFailed,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::AuthUserCreated => f.write_str("AuthUserCreated"),
            EventType::ProfileCreationFailed => f.write_str("ProfileCreationFailed"),
        }
    }
}

/// An identity was committed; carries everything the profile step needs,
/// including the profile id generated up front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUserCreatedEvent {
    auth_id: AuthId,
    profile_id: ProfileId,
    name: String,
    lastname: String,
    age: i64,
}

impl AuthUserCreatedEvent {
    pub fn new(
        auth_id: AuthId,
        profile_id: ProfileId,
        name: String,
        lastname: String,
        age: i64,
    ) -> Self {
        Self {
            auth_id,
            profile_id,
            name,
            lastname,
            age,
        }
    }

    pub fn auth_id(&self) -> &AuthId {
        &self.auth_id
    }

    pub fn profile_id(&self) -> &ProfileId {
        &self.profile_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lastname(&self) -> &str {
        &self.lastname
    }

    pub fn age(&self) -> i64 {
        self.age
    }
}

/// The profile step failed for `auth_id`; the identity must be compensated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileCreationFailedEvent {
    auth_id: AuthId,
    profile_id: ProfileId,
    reason: String,
}

impl ProfileCreationFailedEvent {
    pub fn new(auth_id: AuthId, profile_id: ProfileId, reason: impl Into<String>) -> Self {
        Self {
            auth_id,
            profile_id,
            reason: reason.into(),
        }
    }

    pub fn auth_id(&self) -> &AuthId {
        &self.auth_id
    }

    pub fn profile_id(&self) -> &ProfileId {
        &self.profile_id
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum DomainEvent {
    AuthUserCreated(AuthUserCreatedEvent),
    ProfileCreationFailed(ProfileCreationFailedEvent),
}

impl DomainEvent {
    pub fn event_type(&self) -> EventType {
        match self {
            DomainEvent::AuthUserCreated(_) => EventType::AuthUserCreated,
            DomainEvent::ProfileCreationFailed(_) => EventType::ProfileCreationFailed,
        }
    }

    /// Correlation key shared by every event of one registration.
    pub fn auth_id(&self) -> &AuthId {
        match self {
            DomainEvent::AuthUserCreated(event) => event.auth_id(),
            DomainEvent::ProfileCreationFailed(event) => event.auth_id(),
        }
    }
}

impl From<AuthUserCreatedEvent> for DomainEvent {
    fn from(event: AuthUserCreatedEvent) -> Self {
        DomainEvent::AuthUserCreated(event)
    }
}

impl From<ProfileCreationFailedEvent> for DomainEvent {
    fn from(event: ProfileCreationFailedEvent) -> Self {
        DomainEvent::ProfileCreationFailed(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_by_type() {
        let event: DomainEvent = ProfileCreationFailedEvent::new(
            AuthId::from("auth-1"),
            ProfileId::from("profile-1"),
            "db down",
        )
        .into();

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "ProfileCreationFailed");
        assert_eq!(json["payload"]["auth_id"], "auth-1");
        assert_eq!(event.event_type(), EventType::ProfileCreationFailed);
        assert_eq!(event.auth_id().as_str(), "auth-1");
    }
}
