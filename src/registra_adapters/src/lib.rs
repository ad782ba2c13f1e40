pub mod config;
pub mod crypto;
pub mod messaging;
pub mod persistence;

pub use crypto::{AesGcmEmailVault, Argon2PasswordHasher};
pub use messaging::{
    DeadLetter, DeadLetterQueue, DispatcherHandle, EventDispatcher, InMemoryEventBus,
};
pub use persistence::{
    HashMapAuthStore, HashMapProfileStore, PostgresAuthStore, PostgresProfileStore,
};
