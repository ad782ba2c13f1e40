pub mod email_vault;
pub mod password_hasher;

pub use email_vault::AesGcmEmailVault;
pub use password_hasher::Argon2PasswordHasher;
