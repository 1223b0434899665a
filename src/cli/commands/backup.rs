//! `passvault backup`: copy the encrypted vault file somewhere safe.
//!
//! The copy stays encrypted, so no password is needed.

use std::path::{Path, PathBuf};

use crate::cli::output;
use crate::cli::{Cli, Context};
use crate::errors::{PassVaultError, Result};

/// Directory name used under the vault directory when `--dest` is absent.
pub const DEFAULT_BACKUP_DIR: &str = "backups";

/// Execute the `backup` command.
pub fn execute(cli: &Cli, dest: Option<&Path>) -> Result<()> {
    let ctx = Context::load(cli)?;
    let mut session = ctx.open_session()?;

    if !session.vault_exists() {
        return Err(PassVaultError::VaultNotFound(ctx.vault_path.clone()));
    }

    let dest_dir = dest.map_or_else(|| default_dest(&ctx), Path::to_path_buf);
    let written = session.backup(&dest_dir)?;

    ctx.audit("backup", None, Some(&written.display().to_string()));
    output::success(&format!("Backup written to {}", written.display()));

    Ok(())
}

/// `<vault_dir>/backups`
pub fn default_dest(ctx: &Context) -> PathBuf {
    ctx.vault_dir().join(DEFAULT_BACKUP_DIR)
}
