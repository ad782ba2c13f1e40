use chrono::{DateTime, Utc};

use crate::domain::{
    ids::AuthId,
    role::Role,
    sealed::{BlindIndex, EmailCiphertext, PasswordHash},
};

/// The authentication aggregate.
///
/// The email is only held as ciphertext plus blind index; at most one
/// non-deleted identity may exist per blind index.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthIdentity {
    pub id: AuthId,
    pub email_ciphertext: EmailCiphertext,
    pub email_blind_index: BlindIndex,
    pub password_hash: PasswordHash,
    pub roles: Vec<Role>,
    pub google_id: Option<String>,
    pub apple_id: Option<String>,
    pub refresh_token_hash: Option<PasswordHash>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl AuthIdentity {
    /// A fresh identity with the default `[User]` role set.
    pub fn new(
        id: AuthId,
        email_ciphertext: EmailCiphertext,
        email_blind_index: BlindIndex,
        password_hash: PasswordHash,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            email_ciphertext,
            email_blind_index,
            password_hash,
            roles: vec![Role::User],
            google_id: None,
            apple_id: None,
            refresh_token_hash: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Applies `update` in place and bumps `updated_at`.
    pub fn apply(&mut self, update: AuthIdentityUpdate) {
        if let Some(password_hash) = update.password_hash {
            self.password_hash = password_hash;
        }
        if let Some(roles) = update.roles {
            self.roles = roles;
        }
        if let Some(refresh_token_hash) = update.refresh_token_hash {
            self.refresh_token_hash = refresh_token_hash;
        }
        if let Some(last_login_at) = update.last_login_at {
            self.last_login_at = Some(last_login_at);
        }
        self.updated_at = Utc::now();
    }
}

/// Partial update of an [`AuthIdentity`]. `None` leaves a field untouched;
/// `refresh_token_hash: Some(None)` clears the stored token.
#[derive(Debug, Clone, Default)]
pub struct AuthIdentityUpdate {
    pub password_hash: Option<PasswordHash>,
    pub roles: Option<Vec<Role>>,
    pub refresh_token_hash: Option<Option<PasswordHash>>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl AuthIdentityUpdate {
    pub fn clear_refresh_token() -> Self {
        Self {
            refresh_token_hash: Some(None),
            ..Self::default()
        }
    }
}
