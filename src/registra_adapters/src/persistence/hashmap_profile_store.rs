use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use registra_core::{
    AuthId, AuthStore, Profile, ProfileId, ProfileStore, ProfileStoreError, ProfileUpdate, Role,
};

use crate::persistence::HashMapAuthStore;

/// In-memory profile store.
///
/// Holds a handle to the identity store so that [`ProfileStore::find_by_role`]
/// can join on the identity's roles, as the SQL store does.
#[derive(Clone)]
pub struct HashMapProfileStore {
    profiles: Arc<RwLock<HashMap<ProfileId, Profile>>>,
    auth_store: HashMapAuthStore,
}

impl HashMapProfileStore {
    pub fn new(auth_store: HashMapAuthStore) -> Self {
        Self {
            profiles: Arc::new(RwLock::new(HashMap::new())),
            auth_store,
        }
    }

    fn live(profile: &&Profile) -> bool {
        !profile.is_deleted()
    }
}

#[async_trait::async_trait]
impl ProfileStore for HashMapProfileStore {
    async fn create(&self, profile: Profile) -> Result<(), ProfileStoreError> {
        let mut profiles = self.profiles.write().await;
        let auth_id_taken = profiles
            .values()
            .any(|existing| !existing.is_deleted() && existing.auth_id == profile.auth_id);
        if auth_id_taken || profiles.contains_key(&profile.id) {
            return Err(ProfileStoreError::AlreadyExists);
        }
        profiles.insert(profile.id.clone(), profile);
        Ok(())
    }

    async fn find_by_id(&self, id: &ProfileId) -> Result<Option<Profile>, ProfileStoreError> {
        let profiles = self.profiles.read().await;
        Ok(profiles.get(id).filter(Self::live).cloned())
    }

    async fn find_by_auth_id(
        &self,
        auth_id: &AuthId,
    ) -> Result<Option<Profile>, ProfileStoreError> {
        let profiles = self.profiles.read().await;
        Ok(profiles
            .values()
            .filter(Self::live)
            .find(|profile| &profile.auth_id == auth_id)
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<Profile>, ProfileStoreError> {
        let profiles = self.profiles.read().await;
        let mut all: Vec<Profile> = profiles.values().filter(Self::live).cloned().collect();
        all.sort_by_key(|profile| profile.created_at);
        Ok(all)
    }

    async fn find_by_role(&self, role: Role) -> Result<Vec<Profile>, ProfileStoreError> {
        let mut matching = Vec::new();
        for profile in self.find_all().await? {
            let identity = self
                .auth_store
                .find_by_id(&profile.auth_id)
                .await
                .map_err(|e| ProfileStoreError::UnexpectedError(e.to_string()))?;
            if identity.is_some_and(|identity| identity.has_role(role)) {
                matching.push(profile);
            }
        }
        Ok(matching)
    }

    async fn update(
        &self,
        id: &ProfileId,
        update: ProfileUpdate,
    ) -> Result<Profile, ProfileStoreError> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .get_mut(id)
            .filter(|profile| !profile.is_deleted())
            .ok_or(ProfileStoreError::NotFound)?;

        profile.apply(update);
        Ok(profile.clone())
    }

    async fn soft_delete(&self, id: &ProfileId) -> Result<bool, ProfileStoreError> {
        let mut profiles = self.profiles.write().await;
        let Some(profile) = profiles.get_mut(id).filter(|profile| !profile.is_deleted()) else {
            return Ok(false);
        };

        let now = Utc::now();
        profile.deleted_at = Some(now);
        profile.updated_at = now;
        Ok(true)
    }

    async fn tombstone(&self, id: &ProfileId, auth_id: &AuthId) -> Result<(), ProfileStoreError> {
        let mut profiles = self.profiles.write().await;
        profiles.entry(id.clone()).or_insert_with(|| {
            let mut placeholder =
                Profile::new(id.clone(), auth_id.clone(), String::new(), String::new(), 0);
            placeholder.deleted_at = Some(placeholder.created_at);
            placeholder
        });
        Ok(())
    }
}
