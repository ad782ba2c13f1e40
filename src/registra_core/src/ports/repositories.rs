//! Storage ports for the two aggregates.
//!
//! There is no implicit soft-delete filter anywhere: every `find_*` must
//! exclude rows whose `deleted_at` is set, and implementations are audited
//! for that at each query.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{
    auth_identity::{AuthIdentity, AuthIdentityUpdate},
    ids::{AuthId, ProfileId},
    profile::{Profile, ProfileUpdate},
    role::Role,
    sealed::BlindIndex,
};

// AuthStore port trait and errors
#[derive(Debug, Error)]
pub enum AuthStoreError {
    #[error("An identity with this email already exists")]
    AlreadyExists,
    #[error("Identity not found")]
    NotFound,
    #[error("Unexpected error {0}")]
    UnexpectedError(String),
}

impl PartialEq for AuthStoreError {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::AlreadyExists, Self::AlreadyExists)
                | (Self::NotFound, Self::NotFound)
                | (Self::UnexpectedError(_), Self::UnexpectedError(_))
        )
    }
}

#[async_trait]
pub trait AuthStore: Send + Sync {
    /// Fails with [`AuthStoreError::AlreadyExists`] when a live identity
    /// already owns the blind index or the id.
    async fn create(&self, identity: AuthIdentity) -> Result<(), AuthStoreError>;
    async fn find_by_id(&self, id: &AuthId) -> Result<Option<AuthIdentity>, AuthStoreError>;
    async fn find_by_blind_index(
        &self,
        blind_index: &BlindIndex,
    ) -> Result<Option<AuthIdentity>, AuthStoreError>;
    async fn update(
        &self,
        id: &AuthId,
        update: AuthIdentityUpdate,
    ) -> Result<AuthIdentity, AuthStoreError>;
    /// Returns `false` when there was no live identity to delete.
    async fn soft_delete(&self, id: &AuthId) -> Result<bool, AuthStoreError>;
    async fn clear_refresh_token(&self, id: &AuthId) -> Result<(), AuthStoreError>;
}

// ProfileStore port trait and errors
#[derive(Debug, Error)]
pub enum ProfileStoreError {
    #[error("A profile already exists for this identity")]
    AlreadyExists,
    #[error("Profile not found")]
    NotFound,
    #[error("Unexpected error {0}")]
    UnexpectedError(String),
}

impl PartialEq for ProfileStoreError {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::AlreadyExists, Self::AlreadyExists)
                | (Self::NotFound, Self::NotFound)
                | (Self::UnexpectedError(_), Self::UnexpectedError(_))
        )
    }
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn create(&self, profile: Profile) -> Result<(), ProfileStoreError>;
    async fn find_by_id(&self, id: &ProfileId) -> Result<Option<Profile>, ProfileStoreError>;
    async fn find_by_auth_id(&self, auth_id: &AuthId)
    -> Result<Option<Profile>, ProfileStoreError>;
    async fn find_all(&self) -> Result<Vec<Profile>, ProfileStoreError>;
    /// Live profiles whose identity holds `role`.
    async fn find_by_role(&self, role: Role) -> Result<Vec<Profile>, ProfileStoreError>;
    async fn update(
        &self,
        id: &ProfileId,
        update: ProfileUpdate,
    ) -> Result<Profile, ProfileStoreError>;
    /// Returns `false` when there was no live profile to delete.
    async fn soft_delete(&self, id: &ProfileId) -> Result<bool, ProfileStoreError>;
    /// Reserves `id` with an already deleted row unless a row with that id
    /// exists. A later `create` for `id` then fails with `AlreadyExists`.
    async fn tombstone(&self, id: &ProfileId, auth_id: &AuthId) -> Result<(), ProfileStoreError>;
}
