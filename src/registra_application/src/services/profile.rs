use registra_core::{
    AuthId, AuthIdentity, Profile, ProfileId, ProfileStore, ProfileStoreError, ProfileUpdate,
    Role, ValidationError, auth_rules, profile_rules,
};

#[derive(Debug, thiserror::Error)]
pub enum ProfileServiceError {
    #[error("Profile not found")]
    NotFound,
    #[error("Not allowed to modify this profile")]
    Forbidden,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Profile store error: {0}")]
    ProfileStore(#[from] ProfileStoreError),
}

/// Read and update access to profiles.
pub struct ProfileService<S>
where
    S: ProfileStore,
{
    profile_store: S,
}

impl<S> ProfileService<S>
where
    S: ProfileStore,
{
    pub fn new(profile_store: S) -> Self {
        Self { profile_store }
    }

    /// `None` also covers the window right after registration, before the
    /// saga has written the profile.
    #[tracing::instrument(name = "ProfileService::get_by_auth_id", skip(self))]
    pub async fn get_by_auth_id(
        &self,
        auth_id: &AuthId,
    ) -> Result<Option<Profile>, ProfileServiceError> {
        Ok(self.profile_store.find_by_auth_id(auth_id).await?)
    }

    #[tracing::instrument(name = "ProfileService::get_by_id", skip(self))]
    pub async fn get_by_id(&self, id: &ProfileId) -> Result<Option<Profile>, ProfileServiceError> {
        Ok(self.profile_store.find_by_id(id).await?)
    }

    pub async fn list(&self) -> Result<Vec<Profile>, ProfileServiceError> {
        Ok(self.profile_store.find_all().await?)
    }

    pub async fn list_by_role(&self, role: Role) -> Result<Vec<Profile>, ProfileServiceError> {
        Ok(self.profile_store.find_by_role(role).await?)
    }

    /// Applies `update` if the requester owns the profile or is an admin.
    #[tracing::instrument(
        name = "ProfileService::update",
        skip(self, requester, update),
        fields(requester = %requester.id)
    )]
    pub async fn update(
        &self,
        id: &ProfileId,
        requester: &AuthIdentity,
        update: ProfileUpdate,
    ) -> Result<Profile, ProfileServiceError> {
        let profile = self
            .profile_store
            .find_by_id(id)
            .await?
            .ok_or(ProfileServiceError::NotFound)?;

        let is_admin = auth_rules::can_perform_admin_actions(requester);
        if !profile_rules::can_update_profile(&profile, &requester.id, is_admin) {
            return Err(ProfileServiceError::Forbidden);
        }
        profile_rules::validate_profile_update(&update)?;

        if update.is_empty() {
            return Ok(profile);
        }
        Ok(self.profile_store.update(id, update).await?)
    }
}
