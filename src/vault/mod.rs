//! Vault module: encrypted credential storage.
//!
//! This module provides:
//! - `Credential` and `CredentialCollection` types (`credential`)
//! - The JSON envelope written to disk (`format`)
//! - Atomic envelope persistence and backups (`store`)
//! - The lock/unlock state machine `VaultEngine` (`engine`)

pub mod credential;
pub mod engine;
pub mod format;
pub mod store;

// Re-export the most commonly used items.
pub use credential::{Credential, CredentialCollection};
pub use engine::{VaultEngine, VaultState};
pub use format::{Envelope, CURRENT_VERSION};
pub use store::VaultFile;
