//! `passvault add`: store a new credential.
//!
//! The secret comes from `--generate`, piped stdin, or a hidden prompt:
//!   passvault add github --key octocat --website github.com
//!   echo 'hunter2hunter2' | passvault add legacy-box
//!   passvault add amazon --generate

use crate::cli::output;
use crate::cli::{prompt_secret, Cli, Context};
use crate::errors::Result;
use crate::password;
use crate::vault::credential::validate_identifier;
use crate::vault::Credential;

/// Execute the `add` command.
pub fn execute(
    cli: &Cli,
    identifier: &str,
    key: &str,
    website: &str,
    generate: bool,
) -> Result<()> {
    // Reject a bad identifier before asking for any password.
    validate_identifier(identifier)?;

    let ctx = Context::load(cli)?;
    let mut session = ctx.unlock_session()?;
    ctx.audit("unlock", None, None);

    let secret = if generate {
        password::generate(&ctx.generator_options())?
    } else {
        prompt_secret(identifier)?
    };

    let credential = Credential::new(identifier, key, secret.as_str(), website);
    session.add_credential(credential)?;

    ctx.audit("add", Some(identifier), None);
    if generate {
        output::success(&format!(
            "Stored '{identifier}' with a generated {}-character secret",
            secret.chars().count()
        ));
        output::tip(&format!(
            "Run `passvault copy {identifier}` to put it on the clipboard."
        ));
    } else {
        output::success(&format!("Stored '{identifier}'"));
    }

    Ok(())
}
