//! `passvault list`: display all credentials with secrets masked.

use crate::cli::output;
use crate::cli::{Cli, Context};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let ctx = Context::load(cli)?;
    let mut session = ctx.unlock_session()?;
    ctx.audit("unlock", None, None);

    let credentials = session.list_credentials()?;
    output::print_credentials_table(&credentials);

    Ok(())
}
