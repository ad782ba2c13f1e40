use sqlx::{PgPool, Row, postgres::PgRow};

use registra_core::{
    AuthId, Profile, ProfileId, ProfileStore, ProfileStoreError, ProfileUpdate, Role,
};

const SELECT_PROFILE: &str = r#"
    SELECT p.id, p.auth_id, p.name, p.lastname, p.age,
           p.created_at, p.updated_at, p.deleted_at
    FROM profiles p
"#;

#[derive(Clone)]
pub struct PostgresProfileStore {
    pool: PgPool,
}

impl PostgresProfileStore {
    pub fn new(pool: PgPool) -> Self {
        PostgresProfileStore { pool }
    }
}

fn unexpected(e: impl ToString) -> ProfileStoreError {
    ProfileStoreError::UnexpectedError(e.to_string())
}

fn profile_from_row(row: &PgRow) -> Result<Profile, ProfileStoreError> {
    let age: i16 = row.try_get("age").map_err(unexpected)?;

    Ok(Profile {
        id: ProfileId::from(row.try_get::<String, _>("id").map_err(unexpected)?),
        auth_id: AuthId::from(row.try_get::<String, _>("auth_id").map_err(unexpected)?),
        name: row.try_get("name").map_err(unexpected)?,
        lastname: row.try_get("lastname").map_err(unexpected)?,
        age: u8::try_from(age).map_err(unexpected)?,
        created_at: row.try_get("created_at").map_err(unexpected)?,
        updated_at: row.try_get("updated_at").map_err(unexpected)?,
        deleted_at: row.try_get("deleted_at").map_err(unexpected)?,
    })
}

fn profiles_from_rows(rows: &[PgRow]) -> Result<Vec<Profile>, ProfileStoreError> {
    rows.iter().map(profile_from_row).collect()
}

#[async_trait::async_trait]
impl ProfileStore for PostgresProfileStore {
    #[tracing::instrument(name = "Adding profile to PostgreSQL", skip_all)]
    async fn create(&self, profile: Profile) -> Result<(), ProfileStoreError> {
        sqlx::query(
            r#"
                INSERT INTO profiles (id, auth_id, name, lastname, age, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(profile.id.as_str())
        .bind(profile.auth_id.as_str())
        .bind(&profile.name)
        .bind(&profile.lastname)
        .bind(i16::from(profile.age))
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return ProfileStoreError::AlreadyExists;
                }
            }
            unexpected(e)
        })?;

        Ok(())
    }

    #[tracing::instrument(name = "Retrieving profile from PostgreSQL", skip_all)]
    async fn find_by_id(&self, id: &ProfileId) -> Result<Option<Profile>, ProfileStoreError> {
        let row = sqlx::query(&format!(
            "{SELECT_PROFILE} WHERE p.id = $1 AND p.deleted_at IS NULL"
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        row.as_ref().map(profile_from_row).transpose()
    }

    #[tracing::instrument(name = "Retrieving profile by identity", skip_all)]
    async fn find_by_auth_id(
        &self,
        auth_id: &AuthId,
    ) -> Result<Option<Profile>, ProfileStoreError> {
        let row = sqlx::query(&format!(
            "{SELECT_PROFILE} WHERE p.auth_id = $1 AND p.deleted_at IS NULL"
        ))
        .bind(auth_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        row.as_ref().map(profile_from_row).transpose()
    }

    #[tracing::instrument(name = "Listing profiles", skip_all)]
    async fn find_all(&self) -> Result<Vec<Profile>, ProfileStoreError> {
        let rows = sqlx::query(&format!(
            "{SELECT_PROFILE} WHERE p.deleted_at IS NULL ORDER BY p.created_at"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        profiles_from_rows(&rows)
    }

    #[tracing::instrument(name = "Listing profiles by role", skip_all)]
    async fn find_by_role(&self, role: Role) -> Result<Vec<Profile>, ProfileStoreError> {
        let rows = sqlx::query(&format!(
            r#"{SELECT_PROFILE}
                JOIN auth_identities a ON a.id = p.auth_id
                WHERE $1 = ANY(a.roles)
                  AND p.deleted_at IS NULL
                  AND a.deleted_at IS NULL
                ORDER BY p.created_at"#
        ))
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        profiles_from_rows(&rows)
    }

    #[tracing::instrument(name = "Updating profile in PostgreSQL", skip_all)]
    async fn update(
        &self,
        id: &ProfileId,
        update: ProfileUpdate,
    ) -> Result<Profile, ProfileStoreError> {
        let row = sqlx::query(
            r#"
                UPDATE profiles
                SET name = COALESCE($2, name),
                    lastname = COALESCE($3, lastname),
                    age = COALESCE($4, age),
                    updated_at = NOW()
                WHERE id = $1 AND deleted_at IS NULL
                RETURNING id, auth_id, name, lastname, age, created_at, updated_at, deleted_at
            "#,
        )
        .bind(id.as_str())
        .bind(update.name)
        .bind(update.lastname)
        .bind(update.age.map(i16::from))
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or(ProfileStoreError::NotFound)?;

        profile_from_row(&row)
    }

    #[tracing::instrument(name = "Soft deleting profile", skip_all)]
    async fn soft_delete(&self, id: &ProfileId) -> Result<bool, ProfileStoreError> {
        let result = sqlx::query(
            r#"
                UPDATE profiles
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

    #[tracing::instrument(name = "Reserving profile id in PostgreSQL", skip_all)]
    async fn tombstone(&self, id: &ProfileId, auth_id: &AuthId) -> Result<(), ProfileStoreError> {
        sqlx::query(
            r#"
                INSERT INTO profiles (id, auth_id, name, lastname, age, deleted_at)
                VALUES ($1, $2, '', '', 0, NOW())
                ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(id.as_str())
        .bind(auth_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(())
    }
}
