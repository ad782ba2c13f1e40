//! # Registra - Registration Saga Library
//!
//! Facade crate re-exporting the public APIs of the registration components.
//! A registration writes an identity, then the saga creates the matching
//! profile, compensating the identity when that fails.
//!
//! ## Usage
//!
//! Add to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! registra = { path = "../registra" }
//! ```
//!
//! ## Structure
//!
//! - **Core domain types**: `Email`, `Password`, `AuthIdentity`, `Profile`, events and commands
//! - **Ports**: `AuthStore`, `ProfileStore`, `EmailVault`, `PasswordHasher`, `EventPublisher`
//! - **Application**: command handlers, `CommandBus`, `RegistrationSaga`, services
//! - **Adapters**: HashMap and PostgreSQL stores, AES-GCM vault, Argon2 hasher, in-memory event bus
//! - **Service**: `RegistraService` - the wired system

// ============================================================================
// Core Domain Types
// ============================================================================

/// Core domain types and value objects
pub mod core {
    pub use registra_core::*;
}

// Re-export most commonly used core types at the root level
pub use registra_core::{
    AuthId, AuthIdentity, AuthIdentityUpdate, DomainEvent, Email, EventType, Password, Profile,
    ProfileId, ProfileUpdate, RegistrationData, Role, ValidationError, Violation,
};

// ============================================================================
// Ports
// ============================================================================

/// Storage and infrastructure trait definitions
pub mod ports {
    pub use registra_core::{
        AuthStore, AuthStoreError, DecryptionError, EmailVault, EventBusError, EventPublisher,
        EventSubscriber, HashingError, PasswordHasher, ProfileStore, ProfileStoreError,
        SubscriberError, VaultError,
    };
}

// Re-export port traits at root level
pub use ports::{AuthStore, EmailVault, EventPublisher, EventSubscriber, PasswordHasher, ProfileStore};

// ============================================================================
// Application Layer
// ============================================================================

/// Handlers, buses, saga and services
pub mod application {
    pub use registra_application::*;
}

pub use registra_application::{
    AccountError, AccountService, CommandBus, CommandError, ProfileService, ProfileServiceError,
    RegistrationReceipt, RegistrationSaga, RegistrationService,
};

// ============================================================================
// Adapters (Infrastructure)
// ============================================================================

/// Infrastructure adapters
pub mod adapters {
    /// Persistence implementations
    pub mod persistence {
        pub use registra_adapters::persistence::*;
    }

    /// Email vault and password hashing
    pub mod crypto {
        pub use registra_adapters::crypto::*;
    }

    /// Event bus and dead letters
    pub mod messaging {
        pub use registra_adapters::messaging::*;
    }

    /// Configuration
    pub mod config {
        pub use registra_adapters::config::*;
    }
}

// Re-export commonly used adapters at root level
pub use registra_adapters::{
    AesGcmEmailVault, Argon2PasswordHasher, DeadLetter, DeadLetterQueue, HashMapAuthStore,
    HashMapProfileStore, InMemoryEventBus, PostgresAuthStore, PostgresProfileStore,
    config::RegistraSettings,
};

// ============================================================================
// Registra Service (Main Entry Point)
// ============================================================================

pub use registra_service::{
    RegistraService, ServiceError, configure_postgresql, get_postgres_pool, init_tracing,
};

// ============================================================================
// Re-export common external dependencies
// ============================================================================

/// Re-export async-trait for implementing the port traits
pub use async_trait::async_trait;

/// Re-export secrecy for working with secrets
pub use secrecy::{ExposeSecret, Secret};
