//! `passvault copy`: put a credential's secret on the clipboard.

use crate::cli::{clipboard, output};
use crate::cli::{Cli, Context};
use crate::errors::Result;

/// Execute the `copy` command.
pub fn execute(cli: &Cli, identifier: &str) -> Result<()> {
    let ctx = Context::load(cli)?;
    let mut session = ctx.unlock_session()?;
    ctx.audit("unlock", None, None);

    let credential = session.find_credential(identifier)?;
    clipboard::copy(&credential.secret)?;

    output::success(&format!("Copied the secret of '{identifier}' to the clipboard"));

    Ok(())
}
