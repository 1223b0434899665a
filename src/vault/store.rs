//! Vault file persistence.
//!
//! `VaultFile` only moves envelopes between memory and disk.  It never
//! sees a key or a decrypted credential.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::debug;

use super::format::Envelope;
use crate::errors::{PassVaultError, Result};

/// Handle on the single vault file of an installation.
#[derive(Debug, Clone)]
pub struct VaultFile {
    path: PathBuf,
}

impl VaultFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path to the vault file on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read and parse the envelope.
    pub fn read_envelope(&self) -> Result<Envelope> {
        if !self.path.exists() {
            return Err(PassVaultError::VaultNotFound(self.path.clone()));
        }

        let data = fs::read(&self.path)?;
        debug!(path = %self.path.display(), bytes = data.len(), "read vault envelope");
        Envelope::from_json(&data)
    }

    /// Replace the vault file with `envelope` **atomically**.
    ///
    /// 1. Serialize the envelope.
    /// 2. Write it to a temp file in the same directory and fsync it.
    /// 3. Rename the temp file over the target path.
    ///
    /// If any step fails the previous file is left untouched.
    pub fn write_envelope(&self, envelope: &Envelope) -> Result<()> {
        let buf = envelope.to_json()?;

        let parent = self.parent_dir();
        if !parent.exists() {
            fs::create_dir_all(parent)?;
            restrict_permissions(parent, 0o700);
        }

        let tmp_path = parent.join(format!(
            ".{}.tmp",
            self.path.file_name().unwrap_or_default().to_string_lossy()
        ));

        let written = write_synced(&tmp_path, &buf).and_then(|()| {
            restrict_permissions(&tmp_path, 0o600);
            fs::rename(&tmp_path, &self.path)
        });
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        debug!(path = %self.path.display(), bytes = buf.len(), "wrote vault envelope");
        Ok(())
    }

    /// Copy the encrypted vault file into `dest_dir`.
    ///
    /// The copy is named `vault-<UTC timestamp>.json` and is as safe to
    /// keep as the original: it is never decrypted.
    pub fn backup(&self, dest_dir: &Path) -> Result<PathBuf> {
        if !self.exists() {
            return Err(PassVaultError::VaultNotFound(self.path.clone()));
        }

        fs::create_dir_all(dest_dir)?;
        let stamp = Utc::now().format("%Y%m%dT%H%M%S%.3fZ");
        let dest = dest_dir.join(format!("vault-{stamp}.json"));
        if dest.exists() {
            return Err(PassVaultError::CommandFailed(format!(
                "backup file {} already exists",
                dest.display()
            )));
        }

        fs::copy(&self.path, &dest)?;
        restrict_permissions(&dest, 0o600);
        debug!(from = %self.path.display(), to = %dest.display(), "vault backed up");
        Ok(dest)
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        }
    }
}

fn write_synced(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}

/// On Unix, restrict permissions to the owner.  Best effort.
fn restrict_permissions(path: &Path, mode: u32) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(mode));
    }
    #[cfg(not(unix))]
    let _ = (path, mode);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{Argon2Params, Sealed};
    use tempfile::TempDir;

    fn envelope(byte: u8) -> Envelope {
        Envelope::new(
            Sealed {
                nonce: vec![byte; 12],
                ciphertext: vec![byte; 8],
                tag: vec![byte; 16],
            },
            &[9; 32],
            Argon2Params::minimum(),
        )
    }

    #[test]
    fn write_then_read() {
        let dir = TempDir::new().unwrap();
        let file = VaultFile::new(dir.path().join("nested").join("vault.json"));
        assert!(!file.exists());

        file.write_envelope(&envelope(1)).unwrap();
        assert!(file.exists());
        assert_eq!(file.read_envelope().unwrap(), envelope(1));

        file.write_envelope(&envelope(2)).unwrap();
        assert_eq!(file.read_envelope().unwrap(), envelope(2));
    }

    #[test]
    fn no_temp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let file = VaultFile::new(dir.path().join("vault.json"));
        file.write_envelope(&envelope(1)).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("vault.json")]);
    }

    #[test]
    fn read_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let file = VaultFile::new(dir.path().join("vault.json"));
        assert!(matches!(
            file.read_envelope(),
            Err(PassVaultError::VaultNotFound(_))
        ));
    }

    #[test]
    fn backup_copies_file() {
        let dir = TempDir::new().unwrap();
        let file = VaultFile::new(dir.path().join("vault.json"));
        file.write_envelope(&envelope(5)).unwrap();

        let dest = file.backup(&dir.path().join("backups")).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), fs::read(file.path()).unwrap());
    }

    #[test]
    fn backup_without_vault_fails() {
        let dir = TempDir::new().unwrap();
        let file = VaultFile::new(dir.path().join("vault.json"));
        assert!(file.backup(dir.path()).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn vault_file_has_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let file = VaultFile::new(dir.path().join("vault.json"));
        file.write_envelope(&envelope(1)).unwrap();

        let mode = fs::metadata(file.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
