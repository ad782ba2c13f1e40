pub mod env {
    /// Prefix of every environment override, e.g. `REGISTRA__CRYPTO__BLIND_INDEX_SECRET`.
    pub const ENV_PREFIX: &str = "REGISTRA";
    pub const ENV_SEPARATOR: &str = "__";
    /// Optional settings file, looked up without extension.
    pub const SETTINGS_FILE: &str = "registra";
}

pub mod defaults {
    // Argon2id parameters, matching the cost used for password storage.
    pub const ARGON2_MEMORY_KIB: u32 = 15_000;
    pub const ARGON2_ITERATIONS: u32 = 2;
    pub const ARGON2_PARALLELISM: u32 = 1;

    /// Single attempt: compensation is not retried unless configured.
    pub const MAX_DELIVERY_ATTEMPTS: u32 = 1;
    pub const REDELIVERY_BACKOFF_MILLIS: u64 = 200;

    pub const POSTGRES_MAX_CONNECTIONS: u32 = 5;
}

pub mod test {
    // Cheap hashing keeps the suites fast.
    pub const ARGON2_MEMORY_KIB: u32 = 64;
    pub const ARGON2_ITERATIONS: u32 = 1;

    pub const EMAIL_ENCRYPTION_KEY: &str =
        "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";
    pub const BLIND_INDEX_SECRET: &str = "test-blind-index-secret";
}
