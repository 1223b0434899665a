//! `passvault show`: print one credential, secret included.

use crate::cli::output;
use crate::cli::{Cli, Context};
use crate::errors::Result;

/// Execute the `show` command.
pub fn execute(cli: &Cli, identifier: &str) -> Result<()> {
    let ctx = Context::load(cli)?;
    let mut session = ctx.unlock_session()?;
    ctx.audit("unlock", None, None);

    let credential = session.find_credential(identifier)?;
    output::print_credential(&credential);

    Ok(())
}
