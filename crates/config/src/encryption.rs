//! Decryption of `ENC(...)` property values.
//!
//! Responsibilities:
//! - Define the single `Decrypt` capability the encryption enricher is bound to.
//! - Recognize and unwrap the `ENC(...)` marker syntax.
//! - Provide an AES-256-GCM implementation keyed by a `MasterKeySource`
//!   (hex key from the environment, or Argon2id derivation from a password).
//!
//! Does NOT handle:
//! - Walking the property set (see `enricher::EncryptionEnricher`).
//! - Storing or rotating master keys.
//!
//! Invariants:
//! - Payloads are hex of `nonce(12) || ciphertext+tag`.
//! - Error messages never contain plaintext or key material.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use argon2::Argon2;
use rand::RngExt;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::constants::{
    ENCRYPTED_VALUE_PREFIX, ENCRYPTED_VALUE_SUFFIX, KEY_LEN, NONCE_LEN, SALT_LEN,
};
use crate::environment::Environment;

/// Errors that can occur during encryption operations.
#[derive(Debug, Error)]
pub enum EncryptionError {
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("Invalid key size: expected 32 bytes")]
    InvalidKeySize,

    #[error("Malformed encrypted payload: {0}")]
    MalformedPayload(String),

    #[error("Environment variable error: {0}")]
    EnvError(String),
}

pub type Result<T> = std::result::Result<T, EncryptionError>;

/// The decrypt capability bound to an encryption enricher.
pub trait Decrypt: Send + Sync {
    /// Decrypt the payload found inside an `ENC(...)` marker.
    fn decrypt(&self, payload: &str) -> Result<String>;
}

impl<F> Decrypt for F
where
    F: Fn(&str) -> Result<String> + Send + Sync,
{
    fn decrypt(&self, payload: &str) -> Result<String> {
        self(payload)
    }
}

/// Returns the payload inside `ENC(...)`, or `None` for ordinary values.
pub fn encrypted_payload(value: &str) -> Option<&str> {
    value
        .trim()
        .strip_prefix(ENCRYPTED_VALUE_PREFIX)?
        .strip_suffix(ENCRYPTED_VALUE_SUFFIX)
}

/// Sources for the master encryption key.
#[derive(Debug, Clone)]
pub enum MasterKeySource {
    /// Derive a key from a user-provided password.
    Password(SecretString),
    /// Use a hex-encoded key provided in an environment variable.
    Env(String),
}

impl MasterKeySource {
    /// Resolves the master key source into a 32-byte key.
    pub fn resolve(&self, salt: Option<&[u8]>, environment: &Environment) -> Result<[u8; KEY_LEN]> {
        match self {
            Self::Password(pw) => {
                let salt = salt.ok_or_else(|| {
                    EncryptionError::KeyDerivationFailed(
                        "Salt required for password-based encryption".to_string(),
                    )
                })?;
                Encryptor::derive_key(pw, salt)
            }
            Self::Env(var_name) => {
                let val = environment.get(var_name).ok_or_else(|| {
                    EncryptionError::EnvError(format!("Environment variable {} not set", var_name))
                })?;
                let bytes = hex::decode(val.trim())
                    .map_err(|e| EncryptionError::KeyDerivationFailed(e.to_string()))?;
                <[u8; KEY_LEN]>::try_from(bytes.as_slice())
                    .map_err(|_| EncryptionError::InvalidKeySize)
            }
        }
    }
}

/// Core cryptographic logic for AES-256-GCM.
pub struct Encryptor;

impl Encryptor {
    /// Encrypts data using AES-256-GCM.
    /// Returns (ciphertext + tag, nonce).
    pub fn encrypt(data: &[u8], key: &[u8; KEY_LEN]) -> Result<(Vec<u8>, [u8; NONCE_LEN])> {
        let cipher = Aes256Gcm::new(key.into());
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::rng().fill(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, data)
            .map_err(|e| EncryptionError::EncryptionFailed(e.to_string()))?;

        Ok((ciphertext, nonce_bytes))
    }

    /// Decrypts data using AES-256-GCM.
    pub fn decrypt(
        ciphertext: &[u8],
        key: &[u8; KEY_LEN],
        nonce: &[u8; NONCE_LEN],
    ) -> Result<Vec<u8>> {
        let cipher = Aes256Gcm::new(key.into());
        let nonce = Nonce::from_slice(nonce);

        cipher
            .decrypt(nonce, ciphertext)
            .map_err(|e| EncryptionError::DecryptionFailed(e.to_string()))
    }

    /// Derives a 32-byte key from a password and salt using Argon2id.
    pub fn derive_key(password: &SecretString, salt: &[u8]) -> Result<[u8; KEY_LEN]> {
        let argon2 = Argon2::default();
        let mut key = [0u8; KEY_LEN];
        argon2
            .hash_password_into(password.expose_secret().as_bytes(), salt, &mut key)
            .map_err(|e| EncryptionError::KeyDerivationFailed(e.to_string()))?;
        Ok(key)
    }

    /// Generates a random 16-byte salt for key derivation.
    pub fn generate_salt() -> [u8; SALT_LEN] {
        let mut salt = [0u8; SALT_LEN];
        rand::rng().fill(&mut salt);
        salt
    }
}

/// AES-256-GCM implementation of the decrypt capability.
pub struct AesGcmCipher {
    key: [u8; KEY_LEN],
}

impl std::fmt::Debug for AesGcmCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesGcmCipher")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl AesGcmCipher {
    pub fn new(key: [u8; KEY_LEN]) -> Self {
        Self { key }
    }

    /// Build a cipher from a master key source.
    pub fn from_source(
        source: &MasterKeySource,
        salt: Option<&[u8]>,
        environment: &Environment,
    ) -> Result<Self> {
        source.resolve(salt, environment).map(Self::new)
    }

    /// Derive a cipher from `password` with a freshly generated salt.
    ///
    /// The salt must be stored (e.g. as `salt_hex` in a pipeline file) to
    /// derive the same key again.
    pub fn with_new_salt(password: &SecretString) -> Result<(Self, [u8; SALT_LEN])> {
        let salt = Encryptor::generate_salt();
        let key = Encryptor::derive_key(password, &salt)?;
        Ok((Self::new(key), salt))
    }

    /// Encrypt `plaintext` and wrap it as an `ENC(...)` property value.
    pub fn encrypt_value(&self, plaintext: &str) -> Result<String> {
        let (ciphertext, nonce) = Encryptor::encrypt(plaintext.as_bytes(), &self.key)?;
        let mut payload = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        payload.extend_from_slice(&nonce);
        payload.extend_from_slice(&ciphertext);
        Ok(format!(
            "{}{}{}",
            ENCRYPTED_VALUE_PREFIX,
            hex::encode(payload),
            ENCRYPTED_VALUE_SUFFIX
        ))
    }
}

impl Decrypt for AesGcmCipher {
    fn decrypt(&self, payload: &str) -> Result<String> {
        let bytes = hex::decode(payload.trim())
            .map_err(|e| EncryptionError::MalformedPayload(e.to_string()))?;
        if bytes.len() <= NONCE_LEN {
            return Err(EncryptionError::MalformedPayload(
                "payload shorter than nonce".to_string(),
            ));
        }
        let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);
        let nonce: [u8; NONCE_LEN] = nonce
            .try_into()
            .map_err(|_| EncryptionError::MalformedPayload("bad nonce".to_string()))?;

        let plaintext = Encryptor::decrypt(ciphertext, &self.key, &nonce)?;
        String::from_utf8(plaintext)
            .map_err(|_| EncryptionError::DecryptionFailed("plaintext is not UTF-8".to_string()))
    }
}
