use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use secrecy::Secret;
use serde::Deserialize;

use crate::config::constants::{defaults, env, test};

#[derive(Debug, Clone, Deserialize)]
pub struct RegistraSettings {
    pub crypto: CryptoSettings,
    pub password_hashing: PasswordHashingSettings,
    pub event_bus: EventBusSettings,
    /// Absent when running on the in-memory stores.
    #[serde(default)]
    pub postgres: Option<PostgresSettings>,
}

/// Key material for the email vault. Provisioned externally.
#[derive(Debug, Clone, Deserialize)]
pub struct CryptoSettings {
    /// 32 bytes, hex encoded.
    pub email_encryption_key: Secret<String>,
    pub blind_index_secret: Secret<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordHashingSettings {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventBusSettings {
    pub max_delivery_attempts: u32,
    pub redelivery_backoff_millis: u64,
}

impl EventBusSettings {
    pub fn redelivery_backoff(&self) -> Duration {
        Duration::from_millis(self.redelivery_backoff_millis)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostgresSettings {
    pub url: Secret<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    defaults::POSTGRES_MAX_CONNECTIONS
}

impl RegistraSettings {
    /// Layers built-in defaults, an optional `registra.{toml,json,...}` file
    /// and `REGISTRA__SECTION__KEY` environment variables, in that order.
    /// A `.env` file is loaded first when present.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = Self::with_defaults(Config::builder())?
            .add_source(File::with_name(env::SETTINGS_FILE).required(false))
            .add_source(
                Environment::with_prefix(env::ENV_PREFIX)
                    .prefix_separator(env::ENV_SEPARATOR)
                    .separator(env::ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()?;

        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        config.try_deserialize()
    }

    pub fn with_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        builder
            .set_default(
                "password_hashing.memory_kib",
                i64::from(defaults::ARGON2_MEMORY_KIB),
            )?
            .set_default(
                "password_hashing.iterations",
                i64::from(defaults::ARGON2_ITERATIONS),
            )?
            .set_default(
                "password_hashing.parallelism",
                i64::from(defaults::ARGON2_PARALLELISM),
            )?
            .set_default(
                "event_bus.max_delivery_attempts",
                i64::from(defaults::MAX_DELIVERY_ATTEMPTS),
            )?
            .set_default(
                "event_bus.redelivery_backoff_millis",
                defaults::REDELIVERY_BACKOFF_MILLIS as i64,
            )
    }

    /// Fixed keys and cheap hashing, for test suites only.
    pub fn for_tests() -> Self {
        Self {
            crypto: CryptoSettings {
                email_encryption_key: Secret::new(test::EMAIL_ENCRYPTION_KEY.to_string()),
                blind_index_secret: Secret::new(test::BLIND_INDEX_SECRET.to_string()),
            },
            password_hashing: PasswordHashingSettings {
                memory_kib: test::ARGON2_MEMORY_KIB,
                iterations: test::ARGON2_ITERATIONS,
                parallelism: defaults::ARGON2_PARALLELISM,
            },
            event_bus: EventBusSettings {
                max_delivery_attempts: defaults::MAX_DELIVERY_ATTEMPTS,
                redelivery_backoff_millis: 10,
            },
            postgres: None,
        }
    }
}
