//! `passvault remove`: delete a credential from the vault.

use crate::cli::output;
use crate::cli::{confirm, Cli, Context};
use crate::errors::Result;

/// Execute the `remove` command.
pub fn execute(cli: &Cli, identifier: &str, force: bool) -> Result<()> {
    // Unless --force is set, ask for confirmation before deleting.
    if !force && !confirm(&format!("Remove credential '{identifier}'?"), false)? {
        output::info("Cancelled.");
        return Ok(());
    }

    let ctx = Context::load(cli)?;
    let mut session = ctx.unlock_session()?;
    ctx.audit("unlock", None, None);

    session.remove_credential(identifier)?;

    ctx.audit("remove", Some(identifier), None);
    output::success(&format!("Removed credential '{identifier}'"));

    Ok(())
}
