//! Credential vault.
//!
//! AES-256-GCM over a key derived once (HKDF-SHA256) from the process
//! master key. Ciphertext is `base64(nonce || ciphertext || tag)`, so a
//! value can live in a text column next to the rest of the record.

use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, KeyInit},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use hkdf::Hkdf;
use rand::RngCore;
use rand::rngs::OsRng;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use crate::error::CoreError;
use crate::model::{Credentials, EncryptedCredentials};

/// Length of AES-256 key in bytes.
pub const KEY_LENGTH: usize = 32;

/// Length of GCM nonce in bytes.
const NONCE_LENGTH: usize = 12;

/// Length of GCM authentication tag in bytes.
const TAG_LENGTH: usize = 16;

/// Context string for HKDF key derivation.
const HKDF_INFO: &[u8] = b"airsync-integration-credentials-v1";

/// Encrypts and decrypts integration secrets.
///
/// Constructed once per process and shared by reference; there is no
/// global key state.
#[derive(Clone)]
pub struct CredentialVault {
    cipher: Aes256Gcm,
}

impl CredentialVault {
    /// Create a vault from a 32-byte master key.
    pub fn new(master_key: [u8; KEY_LENGTH]) -> Self {
        let hkdf = Hkdf::<Sha256>::new(None, &master_key);
        let mut derived = [0u8; KEY_LENGTH];
        // 32 bytes is always a valid HKDF-SHA256 output length.
        hkdf.expand(HKDF_INFO, &mut derived)
            .expect("HKDF-SHA256 supports 32-byte output");
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&derived));
        Self { cipher }
    }

    /// Create a vault from a base64-encoded master key.
    pub fn from_base64(encoded: &str) -> Result<Self, CoreError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| CoreError::credential(format!("invalid base64 vault key: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// Create a vault from a hex-encoded master key.
    pub fn from_hex(encoded: &str) -> Result<Self, CoreError> {
        let bytes = hex::decode(encoded.trim())
            .map_err(|e| CoreError::credential(format!("invalid hex vault key: {e}")))?;
        Self::from_bytes(&bytes)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        let key: [u8; KEY_LENGTH] = bytes.try_into().map_err(|_| {
            CoreError::credential(format!(
                "vault key must be {KEY_LENGTH} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self::new(key))
    }

    /// Generate a random master key, base64-encoded.
    pub fn generate_key_base64() -> String {
        let mut key = [0u8; KEY_LENGTH];
        OsRng.fill_bytes(&mut key);
        STANDARD.encode(key)
    }

    // ── Single values ────────────────────────────────────────────────

    pub fn encrypt(&self, plaintext: &str) -> Result<String, CoreError> {
        let mut nonce_bytes = [0u8; NONCE_LENGTH];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| CoreError::credential(format!("encryption failed: {e}")))?;

        let mut sealed = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(sealed))
    }

    /// Decrypt a value produced by [`encrypt`](Self::encrypt).
    ///
    /// Corrupt, truncated or tampered input is always an error.
    pub fn decrypt(&self, ciphertext: &str) -> Result<SecretString, CoreError> {
        let sealed = STANDARD
            .decode(ciphertext)
            .map_err(|e| CoreError::credential(format!("ciphertext is not valid base64: {e}")))?;
        if sealed.len() < NONCE_LENGTH + TAG_LENGTH {
            return Err(CoreError::credential("ciphertext too short"));
        }

        let (nonce_bytes, encrypted) = sealed.split_at(NONCE_LENGTH);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), encrypted)
            .map_err(|_| CoreError::credential("decryption failed: ciphertext was tampered with or sealed under another key"))?;

        String::from_utf8(plaintext)
            .map(SecretString::from)
            .map_err(|_| CoreError::credential("decrypted value is not valid UTF-8"))
    }

    // ── Credential bundles ───────────────────────────────────────────

    /// Encrypt every present field of a bundle; absent fields stay absent.
    pub fn seal(&self, credentials: &Credentials) -> Result<EncryptedCredentials, CoreError> {
        let seal = |field: &Option<SecretString>| {
            field
                .as_ref()
                .map(|secret| self.encrypt(secret.expose_secret()))
                .transpose()
        };

        Ok(EncryptedCredentials {
            api_key: seal(&credentials.api_key)?,
            client_id: seal(&credentials.client_id)?,
            client_secret: seal(&credentials.client_secret)?,
            access_token: seal(&credentials.access_token)?,
            refresh_token: seal(&credentials.refresh_token)?,
            token_expires_at: credentials.token_expires_at,
        })
    }

    /// Decrypt a persisted bundle for immediate use.
    pub fn open(&self, sealed: &EncryptedCredentials) -> Result<Credentials, CoreError> {
        let open = |field: &Option<String>| {
            field
                .as_deref()
                .map(|ciphertext| self.decrypt(ciphertext))
                .transpose()
        };

        Ok(Credentials {
            api_key: open(&sealed.api_key)?,
            client_id: open(&sealed.client_id)?,
            client_secret: open(&sealed.client_secret)?,
            access_token: open(&sealed.access_token)?,
            refresh_token: open(&sealed.refresh_token)?,
            token_expires_at: sealed.token_expires_at,
        })
    }
}

impl std::fmt::Debug for CredentialVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVault")
            .field("key", &"[REDACTED]")
            .finish()
    }
}
