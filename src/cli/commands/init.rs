//! `passvault init`: create a new, empty vault.

use crate::cli::output;
use crate::cli::{prompt_new_password, Cli, Context, PASSWORD_ENV};
use crate::errors::{PassVaultError, Result};

/// Execute the `init` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let ctx = Context::load(cli)?;
    let mut session = ctx.open_session()?;

    if session.vault_exists() {
        output::tip("Use `passvault add` to store credentials in the existing vault.");
        return Err(PassVaultError::VaultAlreadyExists(ctx.vault_path.clone()));
    }

    let password = prompt_new_password(PASSWORD_ENV, "Choose a master password")?;
    session.create(&password)?;

    ctx.audit("create", None, None);
    output::success(&format!("Vault created at {}", ctx.vault_path.display()));
    output::tip("Run `passvault add <IDENTIFIER>` to store your first credential.");

    Ok(())
}
