//! Cryptographic primitives for PassVault.
//!
//! This module provides:
//! - Argon2id password-based key derivation (`kdf`)
//! - The zeroizing session key wrapper (`keys`)
//! - AES-256-GCM sealing and opening (`cipher`)

pub mod cipher;
pub mod kdf;
pub mod keys;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{seal, open, derive_key, ...};
pub use cipher::{open, seal, Sealed};
pub use kdf::{derive_key, generate_salt, Argon2Params};
pub use keys::SessionKey;
