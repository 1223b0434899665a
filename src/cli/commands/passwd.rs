//! `passvault passwd`: change the master password.
//!
//! The vault is re-encrypted under a key derived from the new password
//! and a fresh salt.  Scripted use:
//!   PASSVAULT_PASSWORD=old PASSVAULT_NEW_PASSWORD=new passvault passwd

use crate::cli::output;
use crate::cli::{prompt_new_password, Cli, Context, NEW_PASSWORD_ENV};
use crate::errors::Result;

/// Execute the `passwd` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let ctx = Context::load(cli)?;
    let mut session = ctx.unlock_session()?;
    ctx.audit("unlock", None, None);

    let new_password = prompt_new_password(NEW_PASSWORD_ENV, "New master password")?;
    session.change_master_password(&new_password)?;

    ctx.audit("change-password", None, None);
    output::success("Master password changed");

    Ok(())
}
