pub mod auth_identity;
pub mod email;
pub mod ids;
pub mod password;
pub mod profile;
pub mod role;
pub mod sealed;
