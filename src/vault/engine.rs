//! The vault engine: a lock/unlock state machine over one vault file.
//!
//! While `Locked` the engine holds nothing but the file path.  While
//! `Unlocked` it holds the decrypted credential collection, the session
//! key and the salt/params that key was derived with.  Every mutation is
//! sealed with a fresh nonce and persisted before it is committed to
//! memory, so the in-memory collection always equals the last
//! successfully written envelope.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock, PoisonError};

use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use super::credential::{Credential, CredentialCollection};
use super::format::Envelope;
use super::store::VaultFile;
use crate::crypto::kdf::{derive_key, generate_salt, Argon2Params};
use crate::crypto::{cipher, SessionKey};
use crate::errors::{PassVaultError, Result};
use crate::password;

/// Observable engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultState {
    Locked,
    Unlocked,
}

/// Everything that exists only while the vault is unlocked.
struct UnlockedVault {
    collection: CredentialCollection,
    key: SessionKey,
    salt: Vec<u8>,
    params: Argon2Params,
}

enum SessionState {
    Locked,
    Unlocked(Box<UnlockedVault>),
}

/// The vault handle.  Create one with `VaultEngine::new`, then `create`
/// (first run) and `unlock` it.
pub struct VaultEngine {
    file: VaultFile,

    /// Argon2 params for new vaults and master password changes.
    kdf_params: Argon2Params,

    state: SessionState,

    _guard: OpenGuard,
}

impl VaultEngine {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Build a locked engine over the vault file at `path`.
    ///
    /// Only one engine per vault file may be alive in a process; a
    /// second one fails with `VaultInUse`.
    pub fn new(path: &Path, kdf_params: Argon2Params) -> Result<Self> {
        let guard = OpenGuard::acquire(path)?;
        Ok(Self {
            file: VaultFile::new(path),
            kdf_params,
            state: SessionState::Locked,
            _guard: guard,
        })
    }

    /// Returns the path to the vault file on disk.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn vault_exists(&self) -> bool {
        self.file.exists()
    }

    pub fn state(&self) -> VaultState {
        match self.state {
            SessionState::Locked => VaultState::Locked,
            SessionState::Unlocked(_) => VaultState::Unlocked,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.state() == VaultState::Locked
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Create a brand-new, empty vault protected by `master_password`.
    ///
    /// The engine stays locked; the new vault opens with `unlock`.
    pub fn create(&self, master_password: &str) -> Result<()> {
        if self.file.exists() {
            return Err(PassVaultError::VaultAlreadyExists(self.path().to_path_buf()));
        }
        password::ensure_strong(master_password)?;

        let salt = generate_salt();
        let key = derive_key(master_password.as_bytes(), &salt, &self.kdf_params)?;
        persist(
            &self.file,
            &CredentialCollection::new(),
            &key,
            &salt,
            self.kdf_params,
        )?;

        info!(path = %self.path().display(), "vault created");
        Ok(())
    }

    /// Unlock the vault with `master_password`.
    ///
    /// A missing file is reported as `VaultNotFound` and a read failure
    /// as `Io`.  Everything else (wrong password, tampered or corrupted
    /// file) is reported as `AuthFailure`.  On failure the engine is
    /// locked.
    pub fn unlock(&mut self, master_password: &str) -> Result<()> {
        self.lock();

        match self.open_envelope(master_password) {
            Ok(unlocked) => {
                info!(credentials = unlocked.collection.len(), "vault unlocked");
                self.state = SessionState::Unlocked(Box::new(unlocked));
                Ok(())
            }
            Err(e @ (PassVaultError::VaultNotFound(_) | PassVaultError::Io(_))) => Err(e),
            Err(cause) => {
                debug!(%cause, "unlock rejected");
                warn!("unlock failed");
                Err(PassVaultError::AuthFailure)
            }
        }
    }

    /// Drop the decrypted collection and key material.  No-op when locked.
    pub fn lock(&mut self) {
        if let SessionState::Unlocked(_) = std::mem::replace(&mut self.state, SessionState::Locked)
        {
            info!("vault locked");
        }
    }

    // ------------------------------------------------------------------
    // Credential operations
    // ------------------------------------------------------------------

    /// Snapshot of all credentials, in insertion order.
    pub fn list_credentials(&self) -> Result<Vec<Credential>> {
        Ok(self.unlocked()?.collection.credentials().to_vec())
    }

    pub fn credential_count(&self) -> Result<usize> {
        Ok(self.unlocked()?.collection.len())
    }

    /// A copy of the credential named `identifier`.
    pub fn find_credential(&self, identifier: &str) -> Result<Credential> {
        self.unlocked()?
            .collection
            .get(identifier)
            .cloned()
            .ok_or_else(|| PassVaultError::CredentialNotFound(identifier.to_string()))
    }

    /// Add a credential and persist the vault.
    pub fn add_credential(&mut self, credential: Credential) -> Result<()> {
        let SessionState::Unlocked(vault) = &mut self.state else {
            return Err(PassVaultError::VaultLocked);
        };
        credential.validate()?;

        let identifier = credential.identifier.clone();
        let mut next = vault.collection.clone();
        next.push(credential)?;

        persist(&self.file, &next, &vault.key, &vault.salt, vault.params)?;
        vault.collection = next;

        info!(%identifier, total = vault.collection.len(), "credential added");
        Ok(())
    }

    /// Remove the credential named `identifier` and persist the vault.
    ///
    /// Fails with `CredentialNotFound` if there is no such credential.
    pub fn remove_credential(&mut self, identifier: &str) -> Result<()> {
        let SessionState::Unlocked(vault) = &mut self.state else {
            return Err(PassVaultError::VaultLocked);
        };

        let mut next = vault.collection.clone();
        next.remove(identifier)?;

        persist(&self.file, &next, &vault.key, &vault.salt, vault.params)?;
        vault.collection = next;

        info!(%identifier, total = vault.collection.len(), "credential removed");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Master password
    // ------------------------------------------------------------------

    /// Check `candidate` against the session key.
    pub fn check_current_password(&self, candidate: &str) -> Result<bool> {
        let vault = self.unlocked()?;
        let key = derive_key(candidate.as_bytes(), &vault.salt, &vault.params)?;
        Ok(key.matches(&vault.key))
    }

    /// Re-encrypt the vault under `new_password` with a fresh salt.
    ///
    /// The session switches to the new key only after the new envelope
    /// is on disk; if writing fails the old key stays active.
    pub fn change_master_password(&mut self, new_password: &str) -> Result<()> {
        if self.check_current_password(new_password)? {
            return Err(PassVaultError::PasswordUnchanged);
        }
        password::ensure_strong(new_password)?;

        let SessionState::Unlocked(vault) = &mut self.state else {
            return Err(PassVaultError::VaultLocked);
        };

        let salt = generate_salt();
        let key = derive_key(new_password.as_bytes(), &salt, &self.kdf_params)?;
        persist(&self.file, &vault.collection, &key, &salt, self.kdf_params)?;

        vault.key = key;
        vault.salt = salt.to_vec();
        vault.params = self.kdf_params;

        info!("master password changed");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn unlocked(&self) -> Result<&UnlockedVault> {
        match &self.state {
            SessionState::Unlocked(vault) => Ok(vault),
            SessionState::Locked => Err(PassVaultError::VaultLocked),
        }
    }

    /// Read, derive, decrypt and validate, keeping the precise error.
    fn open_envelope(&self, master_password: &str) -> Result<UnlockedVault> {
        let envelope = self.file.read_envelope()?;
        let params = envelope.kdf.params;
        let key = derive_key(master_password.as_bytes(), &envelope.salt, &params)?;

        let plaintext = cipher::open(&key, &envelope.sealed())?;
        let collection: CredentialCollection = serde_json::from_slice(&plaintext)
            .map_err(|e| PassVaultError::InvalidVaultFormat(format!("credentials JSON: {e}")))?;
        collection.check_invariants()?;

        Ok(UnlockedVault {
            collection,
            key,
            salt: envelope.salt,
            params,
        })
    }
}

impl std::fmt::Debug for VaultEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultEngine")
            .field("path", &self.file.path())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Serialize, seal under `key` with a fresh nonce, and write atomically.
fn persist(
    file: &VaultFile,
    collection: &CredentialCollection,
    key: &SessionKey,
    salt: &[u8],
    params: Argon2Params,
) -> Result<()> {
    let plaintext = Zeroizing::new(
        serde_json::to_vec(collection)
            .map_err(|e| PassVaultError::SerializationError(format!("credentials: {e}")))?,
    );
    let sealed = cipher::seal(key, &plaintext)?;
    file.write_envelope(&Envelope::new(sealed, salt, params))
}

// ---------------------------------------------------------------------------
// One engine per vault file
// ---------------------------------------------------------------------------

fn open_vaults() -> &'static Mutex<HashSet<PathBuf>> {
    static OPEN: OnceLock<Mutex<HashSet<PathBuf>>> = OnceLock::new();
    OPEN.get_or_init(|| Mutex::new(HashSet::new()))
}

/// Registration of a vault path in the process-wide open set.
struct OpenGuard {
    key: PathBuf,
}

impl OpenGuard {
    fn acquire(path: &Path) -> Result<Self> {
        let key = normalize(path);
        let mut open = open_vaults().lock().unwrap_or_else(PoisonError::into_inner);
        if !open.insert(key.clone()) {
            return Err(PassVaultError::VaultInUse(path.to_path_buf()));
        }
        Ok(Self { key })
    }
}

impl Drop for OpenGuard {
    fn drop(&mut self) {
        open_vaults()
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

/// Absolute path with the parent directory canonicalized when it exists.
fn normalize(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let canonical = absolute
        .parent()
        .zip(absolute.file_name())
        .and_then(|(parent, name)| std::fs::canonicalize(parent).ok().map(|p| p.join(name)));
    canonical.unwrap_or(absolute)
}
