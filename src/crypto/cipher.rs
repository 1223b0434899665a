//! AES-256-GCM authenticated encryption.
//!
//! Each call to `seal` generates a fresh random 12-byte nonce.  The
//! nonce, ciphertext and 16-byte auth tag are returned as separate
//! fields because the vault envelope stores them separately.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use zeroize::Zeroizing;

use super::keys::SessionKey;
use crate::errors::{PassVaultError, Result};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the AES-256-GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Output of `seal`: everything `open` needs besides the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub nonce: Vec<u8>,
    pub ciphertext: Vec<u8>,
    pub tag: Vec<u8>,
}

/// Encrypt and authenticate `plaintext` under `key` with a fresh nonce.
pub fn seal(key: &SessionKey, plaintext: &[u8]) -> Result<Sealed> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| PassVaultError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    // aes-gcm appends the tag to the ciphertext.
    let mut ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| PassVaultError::EncryptionFailed(format!("encryption error: {e}")))?;

    let split_at = ciphertext
        .len()
        .checked_sub(TAG_LEN)
        .ok_or_else(|| PassVaultError::EncryptionFailed("ciphertext shorter than tag".into()))?;
    let tag = ciphertext.split_off(split_at);

    Ok(Sealed {
        nonce: nonce.to_vec(),
        ciphertext,
        tag,
    })
}

/// Verify the tag and decrypt.
///
/// Every failure collapses into `DecryptionFailed`: a wrong key and a
/// flipped bit are indistinguishable to the caller.
pub fn open(key: &SessionKey, sealed: &Sealed) -> Result<Zeroizing<Vec<u8>>> {
    if sealed.nonce.len() != NONCE_LEN || sealed.tag.len() != TAG_LEN {
        return Err(PassVaultError::DecryptionFailed);
    }

    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| PassVaultError::DecryptionFailed)?;
    let nonce = Nonce::from_slice(&sealed.nonce);

    let mut payload = Vec::with_capacity(sealed.ciphertext.len() + TAG_LEN);
    payload.extend_from_slice(&sealed.ciphertext);
    payload.extend_from_slice(&sealed.tag);

    let plaintext = cipher
        .decrypt(nonce, payload.as_slice())
        .map_err(|_| PassVaultError::DecryptionFailed)?;

    Ok(Zeroizing::new(plaintext))
}
