pub mod helpers;
pub mod registra_service;
pub mod telemetry;

use registra_core::{HashingError, VaultError};

pub use helpers::{configure_postgresql, get_postgres_pool, run_migrations};
pub use registra_service::{Accounts, RegistraService};
pub use telemetry::init_tracing;

/// Failures while assembling the service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Email vault misconfigured: {0}")]
    Vault(#[from] VaultError),
    #[error("Password hasher misconfigured: {0}")]
    Hashing(#[from] HashingError),
    #[error("PostgreSQL settings are missing")]
    MissingPostgresSettings,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}
