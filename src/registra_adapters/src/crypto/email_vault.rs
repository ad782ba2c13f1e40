//! Encrypted-searchable storage of emails.
//!
//! Emails are stored twice: as AES-256-GCM ciphertext under a fresh random
//! nonce, and as an HMAC-SHA256 blind index of the normalized address. Only
//! the blind index is ever queried or constrained unique.

use std::fmt;

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, AeadCore, KeyInit, OsRng},
};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, Secret};
use sha2::Sha256;

use registra_core::{BlindIndex, DecryptionError, Email, EmailCiphertext, EmailVault, VaultError};

use crate::config::CryptoSettings;

type HmacSha256 = Hmac<Sha256>;

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

#[derive(Clone)]
pub struct AesGcmEmailVault {
    cipher: Aes256Gcm,
    blind_index_mac: HmacSha256,
}

impl AesGcmEmailVault {
    pub fn new(
        encryption_key_hex: &Secret<String>,
        blind_index_secret: &Secret<String>,
    ) -> Result<Self, VaultError> {
        let key_bytes = hex::decode(encryption_key_hex.expose_secret().trim())
            .map_err(|e| VaultError::InvalidKey(format!("Encryption key is not hex: {e}")))?;
        if key_bytes.len() != KEY_LEN {
            return Err(VaultError::InvalidKey(format!(
                "Encryption key must be {KEY_LEN} bytes, got {}",
                key_bytes.len()
            )));
        }
        let cipher = Aes256Gcm::new_from_slice(&key_bytes)
            .map_err(|e| VaultError::InvalidKey(e.to_string()))?;

        if blind_index_secret.expose_secret().is_empty() {
            return Err(VaultError::InvalidKey(
                "Blind index secret must not be empty".to_string(),
            ));
        }
        let blind_index_mac =
            <HmacSha256 as Mac>::new_from_slice(blind_index_secret.expose_secret().as_bytes())
                .map_err(|e| VaultError::InvalidKey(e.to_string()))?;

        Ok(Self {
            cipher,
            blind_index_mac,
        })
    }

    pub fn from_settings(settings: &CryptoSettings) -> Result<Self, VaultError> {
        Self::new(&settings.email_encryption_key, &settings.blind_index_secret)
    }
}

impl fmt::Debug for AesGcmEmailVault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesGcmEmailVault").finish_non_exhaustive()
    }
}

impl EmailVault for AesGcmEmailVault {
    fn blind_index(&self, email: &Email) -> BlindIndex {
        let mut mac = self.blind_index_mac.clone();
        mac.update(email.normalized().as_bytes());
        BlindIndex::new(hex::encode(mac.finalize().into_bytes()))
    }

    fn encrypt(&self, email: &Email) -> Result<EmailCiphertext, VaultError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, email.as_ref().expose_secret().as_bytes())
            .map_err(|_| VaultError::EncryptionFailed)?;

        let mut output = nonce.to_vec();
        output.extend(ciphertext);
        Ok(EmailCiphertext::new(BASE64.encode(output)))
    }

    fn decrypt(&self, ciphertext: &EmailCiphertext) -> Result<Email, DecryptionError> {
        let bytes = BASE64
            .decode(ciphertext.as_str())
            .map_err(|_| DecryptionError::MalformedEncoding)?;
        if bytes.len() < NONCE_LEN + TAG_LEN {
            return Err(DecryptionError::Truncated(bytes.len()));
        }

        let (nonce_bytes, sealed) = bytes.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), sealed)
            .map_err(|_| DecryptionError::Tampered)?;

        let plaintext = String::from_utf8(plaintext).map_err(|_| DecryptionError::InvalidPlaintext)?;
        Email::try_from(Secret::new(plaintext)).map_err(|_| DecryptionError::InvalidPlaintext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::constants::test::{BLIND_INDEX_SECRET, EMAIL_ENCRYPTION_KEY};
    use fake::{Fake, faker::internet::en::SafeEmail};
    use quickcheck_macros::quickcheck;
    use std::collections::HashSet;

    fn secret(s: &str) -> Secret<String> {
        Secret::new(s.to_string())
    }

    fn vault() -> AesGcmEmailVault {
        AesGcmEmailVault::new(&secret(EMAIL_ENCRYPTION_KEY), &secret(BLIND_INDEX_SECRET)).unwrap()
    }

    fn email(s: &str) -> Email {
        Email::try_from(secret(s)).unwrap()
    }

    #[test]
    fn rejects_bad_key_material() {
        let short = AesGcmEmailVault::new(&secret("abcd"), &secret(BLIND_INDEX_SECRET));
        let not_hex = AesGcmEmailVault::new(&secret("zz"), &secret(BLIND_INDEX_SECRET));
        let no_pepper = AesGcmEmailVault::new(&secret(EMAIL_ENCRYPTION_KEY), &secret(""));
        assert!(matches!(short, Err(VaultError::InvalidKey(_))));
        assert!(matches!(not_hex, Err(VaultError::InvalidKey(_))));
        assert!(matches!(no_pepper, Err(VaultError::InvalidKey(_))));
    }

    #[test]
    fn blind_index_is_deterministic_and_case_insensitive() {
        let vault = vault();
        let first = vault.blind_index(&email("Ann.Lee@Example.com"));
        let second = vault.blind_index(&email("ann.lee@example.com"));
        assert_eq!(first, second);
        assert_eq!(first.as_str().len(), 64);
    }

    #[test]
    fn blind_index_does_not_collide_across_a_corpus() {
        let vault = vault();
        let emails: HashSet<String> = (0..500)
            .map(|_| SafeEmail().fake::<String>().to_lowercase())
            .collect();
        let indices: HashSet<BlindIndex> = emails.iter().map(|e| vault.blind_index(&email(e))).collect();
        assert_eq!(indices.len(), emails.len());
    }

    #[test]
    fn blind_index_depends_on_the_secret() {
        let other = AesGcmEmailVault::new(&secret(EMAIL_ENCRYPTION_KEY), &secret("other")).unwrap();
        let e = email("a@b.com");
        assert_ne!(vault().blind_index(&e), other.blind_index(&e));
    }

    #[test]
    fn encryption_is_not_deterministic() {
        let vault = vault();
        let e = email("a@b.com");
        let first = vault.encrypt(&e).unwrap();
        let second = vault.encrypt(&e).unwrap();
        assert_ne!(first, second);
        assert_eq!(vault.decrypt(&first).unwrap(), e);
        assert_eq!(vault.decrypt(&second).unwrap(), e);
    }

    #[test]
    fn tampering_is_detected() {
        let vault = vault();
        let ciphertext = vault.encrypt(&email("a@b.com")).unwrap();
        let mut bytes = BASE64.decode(ciphertext.as_str()).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        let tampered = EmailCiphertext::new(BASE64.encode(bytes));

        assert_eq!(vault.decrypt(&tampered), Err(DecryptionError::Tampered));
    }

    #[test]
    fn malformed_ciphertext_is_an_error_not_a_passthrough() {
        let vault = vault();
        assert_eq!(
            vault.decrypt(&EmailCiphertext::new("not base64!".into())),
            Err(DecryptionError::MalformedEncoding)
        );
        assert_eq!(
            vault.decrypt(&EmailCiphertext::new(BASE64.encode([0u8; 8]))),
            Err(DecryptionError::Truncated(8))
        );
    }

    #[test]
    fn other_key_cannot_decrypt() {
        let other = AesGcmEmailVault::new(
            &secret("ff0102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f"),
            &secret(BLIND_INDEX_SECRET),
        )
        .unwrap();
        let ciphertext = vault().encrypt(&email("a@b.com")).unwrap();
        assert_eq!(other.decrypt(&ciphertext), Err(DecryptionError::Tampered));
    }

    #[quickcheck]
    fn decrypt_inverts_encrypt(local: String) -> bool {
        let local: String = local.chars().filter(|c| c.is_alphanumeric()).collect();
        let address = format!("{local}x@example.org");
        let e = email(&address);
        let vault = vault();
        vault
            .decrypt(&vault.encrypt(&e).unwrap())
            .map(|d| d.as_ref().expose_secret() == &address)
            .unwrap_or(false)
    }
}
