pub mod hashmap_auth_store;
pub mod hashmap_profile_store;
pub mod postgres_auth_store;
pub mod postgres_profile_store;

pub use hashmap_auth_store::HashMapAuthStore;
pub use hashmap_profile_store::HashMapProfileStore;
pub use postgres_auth_store::PostgresAuthStore;
pub use postgres_profile_store::PostgresProfileStore;
