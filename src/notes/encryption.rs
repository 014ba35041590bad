//! Note Encryption
//!
//! Password-based note sealing: a key is derived from the user's password
//! with PBKDF2-SHA256 and the content is sealed with XChaCha20-Poly1305.
//! Ciphertext and salt are stored base64-encoded in the note row, alongside
//! a SHA-256 hash of the password for cheap verification before attempting
//! decryption.

use base64::{engine::general_purpose::URL_SAFE, Engine};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::{Digest, Sha256};
use thiserror::Error;

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 24;
const KEY_LEN: usize = 32;
const PBKDF2_ITERATIONS: u32 = 100_000;

#[derive(Debug, Error)]
pub enum EncryptionError {
    #[error("encryption failed")]
    Seal,
    #[error("decryption failed: wrong password or corrupted data")]
    Open,
    #[error("invalid encoding: {0}")]
    Encoding(String),
}

/// Sealed note content plus the salt needed to re-derive the key.
#[derive(Debug, Clone)]
pub struct SealedContent {
    /// Nonce-prefixed ciphertext, base64.
    pub ciphertext: String,
    /// Key-derivation salt, base64.
    pub salt: String,
}

fn derive_key(password: &str, salt: &[u8]) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key);
    key
}

/// Seal note content with a password.
pub fn encrypt_content(content: &str, password: &str) -> Result<SealedContent, EncryptionError> {
    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);

    let key = derive_key(password, &salt);
    let cipher = XChaCha20Poly1305::new((&key).into());

    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = XNonce::from_slice(&nonce_bytes);

    let sealed = cipher
        .encrypt(nonce, content.as_bytes())
        .map_err(|_| EncryptionError::Seal)?;

    // Nonce travels with the ciphertext.
    let mut blob = Vec::with_capacity(NONCE_LEN + sealed.len());
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&sealed);

    Ok(SealedContent {
        ciphertext: URL_SAFE.encode(blob),
        salt: URL_SAFE.encode(salt),
    })
}

/// Open sealed note content with a password.
pub fn decrypt_content(
    ciphertext: &str,
    password: &str,
    salt: &str,
) -> Result<String, EncryptionError> {
    let salt_bytes = URL_SAFE
        .decode(salt)
        .map_err(|e| EncryptionError::Encoding(e.to_string()))?;
    let blob = URL_SAFE
        .decode(ciphertext)
        .map_err(|e| EncryptionError::Encoding(e.to_string()))?;

    if blob.len() < NONCE_LEN {
        return Err(EncryptionError::Encoding("ciphertext too short".to_string()));
    }
    let (nonce_bytes, sealed) = blob.split_at(NONCE_LEN);

    let key = derive_key(password, &salt_bytes);
    let cipher = XChaCha20Poly1305::new((&key).into());

    let plaintext = cipher
        .decrypt(XNonce::from_slice(nonce_bytes), sealed)
        .map_err(|_| EncryptionError::Open)?;

    String::from_utf8(plaintext).map_err(|e| EncryptionError::Encoding(e.to_string()))
}

/// SHA-256 hex digest of the password, stored for verification.
pub fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    hex::encode(digest)
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    hash_password(password) == password_hash
}
