// Hand-written doubles for the core ports, shared by the unit tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use secrecy::{ExposeSecret, Secret};
use tokio::sync::{Mutex, RwLock};

use registra_core::{
    AuthId, AuthIdentity, AuthIdentityUpdate, AuthStore, AuthStoreError, BlindIndex,
    DecryptionError, DomainEvent, Email, EmailCiphertext, EmailVault, EventBusError,
    EventPublisher, HashingError, Password, PasswordHash, PasswordHasher, Profile, ProfileId,
    ProfileStore, ProfileStoreError, ProfileUpdate, RegistrationData, Role, VaultError,
};

pub fn registration(email: &str) -> RegistrationData {
    RegistrationData {
        email: Secret::new(email.to_string()),
        password: Secret::new("Secret123".to_string()),
        name: "Ann".to_string(),
        lastname: "Lee".to_string(),
        age: 30,
    }
}

#[derive(Clone, Default)]
pub struct MockAuthStore {
    pub identities: Arc<RwLock<HashMap<AuthId, AuthIdentity>>>,
    pub fail_deletes: Arc<AtomicBool>,
}

impl MockAuthStore {
    pub async fn live_count(&self) -> usize {
        self.identities
            .read()
            .await
            .values()
            .filter(|identity| !identity.is_deleted())
            .count()
    }
}

#[async_trait::async_trait]
impl AuthStore for MockAuthStore {
    async fn create(&self, identity: AuthIdentity) -> Result<(), AuthStoreError> {
        let mut identities = self.identities.write().await;
        let taken = identities.values().any(|existing| {
            !existing.is_deleted() && existing.email_blind_index == identity.email_blind_index
        });
        if taken || identities.contains_key(&identity.id) {
            return Err(AuthStoreError::AlreadyExists);
        }
        identities.insert(identity.id.clone(), identity);
        Ok(())
    }

    async fn find_by_id(&self, id: &AuthId) -> Result<Option<AuthIdentity>, AuthStoreError> {
        let identities = self.identities.read().await;
        Ok(identities.get(id).filter(|i| !i.is_deleted()).cloned())
    }

    async fn find_by_blind_index(
        &self,
        blind_index: &BlindIndex,
    ) -> Result<Option<AuthIdentity>, AuthStoreError> {
        let identities = self.identities.read().await;
        Ok(identities
            .values()
            .find(|i| !i.is_deleted() && &i.email_blind_index == blind_index)
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
            .filter(|i| !i.is_deleted())
            .ok_or(AuthStoreError::NotFound)?;
        identity.apply(update);
        Ok(identity.clone())
    }

    async fn soft_delete(&self, id: &AuthId) -> Result<bool, AuthStoreError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(AuthStoreError::UnexpectedError("delete refused".into()));
        }
        let mut identities = self.identities.write().await;
        match identities.get_mut(id).filter(|i| !i.is_deleted()) {
            Some(identity) => {
                identity.deleted_at = Some(chrono::Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn clear_refresh_token(&self, id: &AuthId) -> Result<(), AuthStoreError> {
        self.update(id, AuthIdentityUpdate::clear_refresh_token())
            .await
            .map(|_| ())
    }
}

#[derive(Clone, Default)]
pub struct MockProfileStore {
    pub profiles: Arc<RwLock<HashMap<ProfileId, Profile>>>,
    pub fail_creates: Arc<AtomicBool>,
}

#[async_trait::async_trait]
impl ProfileStore for MockProfileStore {
    async fn create(&self, profile: Profile) -> Result<(), ProfileStoreError> {
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(ProfileStoreError::UnexpectedError("connection reset".into()));
        }
        let mut profiles = self.profiles.write().await;
        if profiles.contains_key(&profile.id) {
            return Err(ProfileStoreError::AlreadyExists);
        }
        profiles.insert(profile.id.clone(), profile);
        Ok(())
    }

    async fn find_by_id(&self, id: &ProfileId) -> Result<Option<Profile>, ProfileStoreError> {
        let profiles = self.profiles.read().await;
        Ok(profiles.get(id).filter(|p| !p.is_deleted()).cloned())
    }

    async fn find_by_auth_id(
        &self,
        auth_id: &AuthId,
    ) -> Result<Option<Profile>, ProfileStoreError> {
        let profiles = self.profiles.read().await;
        Ok(profiles
            .values()
            .find(|p| !p.is_deleted() && &p.auth_id == auth_id)
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<Profile>, ProfileStoreError> {
        let profiles = self.profiles.read().await;
        Ok(profiles.values().filter(|p| !p.is_deleted()).cloned().collect())
    }

    async fn find_by_role(&self, _role: Role) -> Result<Vec<Profile>, ProfileStoreError> {
        Ok(Vec::new())
    }

    async fn update(
        &self,
        id: &ProfileId,
        update: ProfileUpdate,
    ) -> Result<Profile, ProfileStoreError> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .get_mut(id)
            .filter(|p| !p.is_deleted())
            .ok_or(ProfileStoreError::NotFound)?;
        profile.apply(update);
        Ok(profile.clone())
    }

    async fn soft_delete(&self, id: &ProfileId) -> Result<bool, ProfileStoreError> {
        let mut profiles = self.profiles.write().await;
        match profiles.get_mut(id).filter(|p| !p.is_deleted()) {
            Some(profile) => {
                profile.deleted_at = Some(chrono::Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
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

/// Reversible stand-in for the real vault; only the contract matters here.
#[derive(Clone, Default)]
pub struct MockVault;

impl EmailVault for MockVault {
    fn blind_index(&self, email: &Email) -> BlindIndex {
        BlindIndex::new(format!("idx:{}", email.normalized()))
    }

    fn encrypt(&self, email: &Email) -> Result<EmailCiphertext, VaultError> {
        Ok(EmailCiphertext::new(format!(
            "enc:{}",
            email.as_ref().expose_secret()
        )))
    }

    fn decrypt(&self, ciphertext: &EmailCiphertext) -> Result<Email, DecryptionError> {
        let plaintext = ciphertext
            .as_str()
            .strip_prefix("enc:")
            .ok_or(DecryptionError::Tampered)?;
        Email::try_from(Secret::new(plaintext.to_string()))
            .map_err(|_| DecryptionError::InvalidPlaintext)
    }
}

#[derive(Clone, Default)]
pub struct MockHasher;

#[async_trait::async_trait]
impl PasswordHasher for MockHasher {
    async fn hash(&self, password: Password) -> Result<PasswordHash, HashingError> {
        self.hash_token(password.as_ref().clone()).await
    }

    async fn hash_token(&self, token: Secret<String>) -> Result<PasswordHash, HashingError> {
        Ok(PasswordHash::new(Secret::new(format!(
            "hash:{}",
            token.expose_secret()
        ))))
    }

    async fn verify(
        &self,
        expected: &PasswordHash,
        candidate: Secret<String>,
    ) -> Result<bool, HashingError> {
        Ok(expected.as_ref().expose_secret() == &format!("hash:{}", candidate.expose_secret()))
    }
}

#[derive(Clone, Default)]
pub struct RecordingPublisher {
    pub events: Arc<Mutex<Vec<DomainEvent>>>,
}

impl RecordingPublisher {
    pub async fn published(&self) -> Vec<DomainEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: DomainEvent) -> Result<(), EventBusError> {
        self.events.lock().await.push(event);
        Ok(())
    }
}
