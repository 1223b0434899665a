//! Password-based key derivation using Argon2id.
//!
//! Argon2id is a memory-hard KDF that makes brute-forcing the master
//! password off a stolen vault file expensive.  The parameters used to
//! create a vault are stored in its envelope, so a vault keeps opening
//! even if the configured defaults change later.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::OsRng;
use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use super::keys::{SessionKey, KEY_LEN};
use crate::errors::{PassVaultError, Result};

/// Length of the salt in bytes (256 bits).
pub const SALT_LEN: usize = 32;

/// Minimum safe memory cost in KiB (8 MB).
const MIN_MEMORY_KIB: u32 = 8_192;

/// Largest memory cost accepted, in KiB (1 GiB).  The envelope is
/// untrusted input; argon2 aborts the process if an allocation fails.
pub const MAX_MEMORY_KIB: u32 = 1_048_576;

/// Largest iteration count accepted.
pub const MAX_ITERATIONS: u32 = 64;

/// Largest lane count accepted.
pub const MAX_PARALLELISM: u32 = 255;

/// Argon2id work-factor parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argon2Params {
    /// Memory cost in KiB (default: 65 536 = 64 MB).
    pub memory_kib: u32,
    /// Number of iterations (default: 3).
    pub iterations: u32,
    /// Parallelism lanes (default: 4).
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_kib: 65_536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

impl Argon2Params {
    /// The weakest parameters `derive_key` accepts.
    pub const fn minimum() -> Self {
        Self {
            memory_kib: MIN_MEMORY_KIB,
            iterations: 1,
            parallelism: 1,
        }
    }

    /// Check the parameters lie within the accepted range.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_MEMORY_KIB..=MAX_MEMORY_KIB).contains(&self.memory_kib) {
            return Err(PassVaultError::KeyDerivationFailed(format!(
                "Argon2 memory_kib must be within {MIN_MEMORY_KIB}..={MAX_MEMORY_KIB} (got {})",
                self.memory_kib
            )));
        }
        if !(1..=MAX_ITERATIONS).contains(&self.iterations) {
            return Err(PassVaultError::KeyDerivationFailed(format!(
                "Argon2 iterations must be within 1..={MAX_ITERATIONS} (got {})",
                self.iterations
            )));
        }
        if !(1..=MAX_PARALLELISM).contains(&self.parallelism) {
            return Err(PassVaultError::KeyDerivationFailed(format!(
                "Argon2 parallelism must be within 1..={MAX_PARALLELISM} (got {})",
                self.parallelism
            )));
        }
        Ok(())
    }
}

/// Derive the 32-byte session key from a password and salt.
///
/// The same password + salt + params always produce the same key.
pub fn derive_key(password: &[u8], salt: &[u8], argon2_params: &Argon2Params) -> Result<SessionKey> {
    argon2_params.validate()?;

    let params = Params::new(
        argon2_params.memory_kib,
        argon2_params.iterations,
        argon2_params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| PassVaultError::KeyDerivationFailed(format!("invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = [0u8; KEY_LEN];
    let hashed = argon2
        .hash_password_into(password, salt, &mut key)
        .map_err(|e| PassVaultError::KeyDerivationFailed(format!("Argon2id hashing failed: {e}")));
    if let Err(e) = hashed {
        key.zeroize();
        return Err(e);
    }

    let session_key = SessionKey::new(key);
    key.zeroize();
    Ok(session_key)
}

/// Generate a cryptographically random 32-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}
