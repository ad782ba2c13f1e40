use registra_adapters::config::PostgresSettings;
use secrecy::ExposeSecret;
use sqlx::{PgPool, postgres::PgPoolOptions};

/// Create a PostgreSQL connection pool
pub async fn get_postgres_pool(settings: &PostgresSettings) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(settings.url.expose_secret())
        .await
}

/// Run all pending migrations against `pool`
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Connect and migrate in one step
pub async fn configure_postgresql(
    settings: &PostgresSettings,
) -> Result<PgPool, crate::ServiceError> {
    let pool = get_postgres_pool(settings).await?;
    run_migrations(&pool).await?;
    tracing::info!("PostgreSQL ready, migrations applied");
    Ok(pool)
}
