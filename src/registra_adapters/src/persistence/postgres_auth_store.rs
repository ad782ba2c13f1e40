use secrecy::{ExposeSecret, Secret};
use sqlx::{PgPool, Row, postgres::PgRow};

use registra_core::{
    AuthId, AuthIdentity, AuthIdentityUpdate, AuthStore, AuthStoreError, BlindIndex,
    EmailCiphertext, PasswordHash, Role,
};

const SELECT_IDENTITY: &str = r#"
    SELECT id, email_ciphertext, email_blind_index, password_hash, roles,
           google_id, apple_id, refresh_token_hash,
           last_login_at, created_at, updated_at, deleted_at
    FROM auth_identities
"#;

#[derive(Clone)]
pub struct PostgresAuthStore {
    pool: PgPool,
}

impl PostgresAuthStore {
    pub fn new(pool: PgPool) -> Self {
        PostgresAuthStore { pool }
    }
}

fn unexpected(e: impl ToString) -> AuthStoreError {
    AuthStoreError::UnexpectedError(e.to_string())
}

fn map_write_error(e: sqlx::Error) -> AuthStoreError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return AuthStoreError::AlreadyExists;
        }
    }
    unexpected(e)
}

fn identity_from_row(row: &PgRow) -> Result<AuthIdentity, AuthStoreError> {
    let roles = row
        .try_get::<Vec<String>, _>("roles")
        .map_err(unexpected)?
        .iter()
        .map(|role| role.parse::<Role>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(unexpected)?;

    let secret_hash = |column: &str| -> Result<Option<PasswordHash>, AuthStoreError> {
        Ok(row
            .try_get::<Option<String>, _>(column)
            .map_err(unexpected)?
            .map(|hash| PasswordHash::new(Secret::new(hash))))
    };

    Ok(AuthIdentity {
        id: AuthId::from(row.try_get::<String, _>("id").map_err(unexpected)?),
        email_ciphertext: EmailCiphertext::new(
            row.try_get("email_ciphertext").map_err(unexpected)?,
        ),
        email_blind_index: BlindIndex::new(row.try_get("email_blind_index").map_err(unexpected)?),
        password_hash: secret_hash("password_hash")?
            .ok_or_else(|| unexpected("password_hash is null"))?,
        roles,
        google_id: row.try_get("google_id").map_err(unexpected)?,
        apple_id: row.try_get("apple_id").map_err(unexpected)?,
        refresh_token_hash: secret_hash("refresh_token_hash")?,
        last_login_at: row.try_get("last_login_at").map_err(unexpected)?,
        created_at: row.try_get("created_at").map_err(unexpected)?,
        updated_at: row.try_get("updated_at").map_err(unexpected)?,
        deleted_at: row.try_get("deleted_at").map_err(unexpected)?,
    })
}

fn role_names(roles: &[Role]) -> Vec<String> {
    roles.iter().map(|role| role.as_str().to_owned()).collect()
}

#[async_trait::async_trait]
impl AuthStore for PostgresAuthStore {
    #[tracing::instrument(name = "Adding identity to PostgreSQL", skip_all)]
    async fn create(&self, identity: AuthIdentity) -> Result<(), AuthStoreError> {
        sqlx::query(
            r#"
                INSERT INTO auth_identities
                    (id, email_ciphertext, email_blind_index, password_hash, roles,
                     google_id, apple_id, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(identity.id.as_str())
        .bind(identity.email_ciphertext.as_str())
        .bind(identity.email_blind_index.as_str())
        .bind(identity.password_hash.as_ref().expose_secret())
        .bind(role_names(&identity.roles))
        .bind(identity.google_id.as_deref())
        .bind(identity.apple_id.as_deref())
        .bind(identity.created_at)
        .bind(identity.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(())
    }

    #[tracing::instrument(name = "Retrieving identity from PostgreSQL", skip_all)]
    async fn find_by_id(&self, id: &AuthId) -> Result<Option<AuthIdentity>, AuthStoreError> {
        let row = sqlx::query(&format!(
            "{SELECT_IDENTITY} WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        row.as_ref().map(identity_from_row).transpose()
    }

    #[tracing::instrument(name = "Looking up identity by blind index", skip_all)]
    async fn find_by_blind_index(
        &self,
        blind_index: &BlindIndex,
    ) -> Result<Option<AuthIdentity>, AuthStoreError> {
        let row = sqlx::query(&format!(
            "{SELECT_IDENTITY} WHERE email_blind_index = $1 AND deleted_at IS NULL"
        ))
        .bind(blind_index.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        row.as_ref().map(identity_from_row).transpose()
    }

    #[tracing::instrument(name = "Updating identity in PostgreSQL", skip_all)]
    async fn update(
        &self,
        id: &AuthId,
        update: AuthIdentityUpdate,
    ) -> Result<AuthIdentity, AuthStoreError> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let row = sqlx::query(&format!(
            "{SELECT_IDENTITY} WHERE id = $1 AND deleted_at IS NULL FOR UPDATE"
        ))
        .bind(id.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(unexpected)?
        .ok_or(AuthStoreError::NotFound)?;

        let mut identity = identity_from_row(&row)?;
        identity.apply(update);

        sqlx::query(
            r#"
                UPDATE auth_identities
                SET password_hash = $2, roles = $3, refresh_token_hash = $4,
                    last_login_at = $5, updated_at = $6
                WHERE id = $1
            "#,
        )
        .bind(identity.id.as_str())
        .bind(identity.password_hash.as_ref().expose_secret())
        .bind(role_names(&identity.roles))
        .bind(
            identity
                .refresh_token_hash
                .as_ref()
                .map(|hash| hash.as_ref().expose_secret().clone()),
        )
        .bind(identity.last_login_at)
        .bind(identity.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;

        tx.commit().await.map_err(unexpected)?;
        Ok(identity)
    }

    #[tracing::instrument(name = "Soft deleting identity", skip_all)]
    async fn soft_delete(&self, id: &AuthId) -> Result<bool, AuthStoreError> {
        let result = sqlx::query(
            r#"
                UPDATE auth_identities
                SET deleted_at = NOW(), updated_at = NOW()
                WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(name = "Clearing refresh token", skip_all)]
    async fn clear_refresh_token(&self, id: &AuthId) -> Result<(), AuthStoreError> {
        let result = sqlx::query(
            r#"
                UPDATE auth_identities
                SET refresh_token_hash = NULL, updated_at = NOW()
                WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(AuthStoreError::NotFound);
        }

        Ok(())
    }
}
