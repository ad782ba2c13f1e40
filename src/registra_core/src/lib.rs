pub mod commands;
pub mod domain;
pub mod events;
pub mod ports;
pub mod validation;

// Re-export commonly used types for convenience
pub use domain::{
    auth_identity::{AuthIdentity, AuthIdentityUpdate},
    email::Email,
    ids::{AuthId, ProfileId},
    password::Password,
    profile::{Profile, ProfileUpdate},
    role::Role,
    sealed::{BlindIndex, EmailCiphertext, PasswordHash},
};

pub use commands::{
    Command, CommandKind, CreateAuthUserCommand, CreateProfileCommand, DeleteAuthUserCommand,
    RegistrationData,
};
pub use events::{AuthUserCreatedEvent, DomainEvent, EventType, ProfileCreationFailedEvent};

pub use ports::{
    messaging::{EventBusError, EventPublisher, EventSubscriber, SubscriberError},
    repositories::{AuthStore, AuthStoreError, ProfileStore, ProfileStoreError},
    services::{DecryptionError, EmailVault, HashingError, PasswordHasher, VaultError},
};

pub use validation::{ValidationError, Violation, auth_rules, profile_rules};
