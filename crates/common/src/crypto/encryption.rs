//! AES-256-GCM encryption primitive.
//!
//! This is the low-level cipher; [`super::token::FernetLikeToken`] builds
//! the object store's on-the-wire envelope on top of it.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

/// Errors raised by the symmetric cipher.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("encryption key must be exactly 32 bytes, got {0}")]
    InvalidKeyLength(usize),
    #[error("encryption failed")]
    EncryptFailed,
    #[error("decryption failed")]
    DecryptFailed,
}

pub type Result<T> = std::result::Result<T, CryptoError>;

/// AES-256-GCM encryption service over a fixed 32-byte key.
pub struct EncryptionService {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for EncryptionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionService").field("cipher", &"[REDACTED]").finish()
    }
}

impl EncryptionService {
    /// Create a new encryption service from a raw 32-byte key.
    pub fn new(key: &[u8]) -> Result<Self> {
        if key.len() != 32 {
            return Err(CryptoError::InvalidKeyLength(key.len()));
        }
        let cipher =
            Aes256Gcm::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength(key.len()))?;
        Ok(Self { cipher })
    }

    /// Generate a random 32-byte symmetric key.
    pub fn generate_key() -> [u8; 32] {
        let mut key = [0u8; 32];
        OsRng.fill_bytes(&mut key);
        key
    }

    /// Generate a random 12-byte nonce suitable for AES-256-GCM.
    pub fn generate_nonce() -> [u8; 12] {
        let mut nonce = [0u8; 12];
        OsRng.fill_bytes(&mut nonce);
        nonce
    }

    /// Encrypt `plaintext` under `nonce`, returning the ciphertext+tag.
    pub fn encrypt(&self, nonce: &[u8; 12], plaintext: &[u8]) -> Result<Vec<u8>> {
        self.cipher
            .encrypt(Nonce::from_slice(nonce), plaintext)
            .map_err(|_| CryptoError::EncryptFailed)
    }

    /// Decrypt `ciphertext` (including its trailing GCM tag) under `nonce`.
    pub fn decrypt(&self, nonce: &[u8; 12], ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CryptoError::DecryptFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_key_has_correct_length() {
        assert_eq!(EncryptionService::generate_key().len(), 32);
    }

    #[test]
    fn new_service_rejects_invalid_key_size() {
        assert!(EncryptionService::new(&[0; 16]).is_err());
    }

    #[test]
    fn encrypt_and_decrypt_round_trip() {
        let key = EncryptionService::generate_key();
        let service = EncryptionService::new(&key).unwrap();
        let nonce = EncryptionService::generate_nonce();

        let plaintext = b"hello world";
        let ciphertext = service.encrypt(&nonce, plaintext).unwrap();
        let decrypted = service.decrypt(&nonce, &ciphertext).unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn decrypt_fails_with_wrong_nonce() {
        let key = EncryptionService::generate_key();
        let service = EncryptionService::new(&key).unwrap();
        let nonce = EncryptionService::generate_nonce();
        let other_nonce = EncryptionService::generate_nonce();

        let ciphertext = service.encrypt(&nonce, b"hello world").unwrap();
        assert!(service.decrypt(&other_nonce, &ciphertext).is_err());
    }
}
