use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use registra_core::{
    AuthId, AuthIdentity, AuthIdentityUpdate, AuthStore, AuthStoreError, BlindIndex,
};

/// In-memory identity store. Soft-deleted rows stay in the map and are
/// filtered out by every query.
#[derive(Default, Clone)]
pub struct HashMapAuthStore {
    identities: Arc<RwLock<HashMap<AuthId, AuthIdentity>>>,
}

impl HashMapAuthStore {
    pub fn new() -> Self {
        Self {
            identities: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of identities sharing `blind_index`, deleted ones included.
    pub async fn rows_for(&self, blind_index: &BlindIndex) -> usize {
        self.identities
            .read()
            .await
            .values()
            .filter(|identity| &identity.email_blind_index == blind_index)
            .count()
    }
}

#[async_trait::async_trait]
impl AuthStore for HashMapAuthStore {
    async fn create(&self, identity: AuthIdentity) -> Result<(), AuthStoreError> {
        let mut identities = self.identities.write().await;
        let index_taken = identities.values().any(|existing| {
            !existing.is_deleted() && existing.email_blind_index == identity.email_blind_index
        });
        if index_taken || identities.contains_key(&identity.id) {
            return Err(AuthStoreError::AlreadyExists);
        }
        identities.insert(identity.id.clone(), identity);
        Ok(())
    }

    async fn find_by_id(&self, id: &AuthId) -> Result<Option<AuthIdentity>, AuthStoreError> {
        let identities = self.identities.read().await;
        Ok(identities
            .get(id)
            .filter(|identity| !identity.is_deleted())
            .cloned())
    }

    async fn find_by_blind_index(
        &self,
        blind_index: &BlindIndex,
    ) -> Result<Option<AuthIdentity>, AuthStoreError> {
        let identities = self.identities.read().await;
        Ok(identities
            .values()
            .find(|identity| {
                !identity.is_deleted() && &identity.email_blind_index == blind_index
            })
            .cloned())
    }

    async fn update(
        &self,
        id: &AuthId,
        update: AuthIdentityUpdate,
    ) -> Result<AuthIdentity, AuthStoreError> {
        let mut identities = self.identities.write().await;
        let identity = identities
            .get_mut(id)
            .filter(|identity| !identity.is_deleted())
            .ok_or(AuthStoreError::NotFound)?;

        identity.apply(update);
        Ok(identity.clone())
    }

    async fn soft_delete(&self, id: &AuthId) -> Result<bool, AuthStoreError> {
        let mut identities = self.identities.write().await;
        let Some(identity) = identities
            .get_mut(id)
            .filter(|identity| !identity.is_deleted())
        else {
            return Ok(false);
        };

        let now = Utc::now();
        identity.deleted_at = Some(now);
        identity.updated_at = now;
        Ok(true)
    }

    async fn clear_refresh_token(&self, id: &AuthId) -> Result<(), AuthStoreError> {
        self.update(id, AuthIdentityUpdate::clear_refresh_token())
            .await?;
        Ok(())
    }
}
