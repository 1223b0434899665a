//! `passvault generate`: print (or copy) a strong random password.
//!
//! Does not touch the vault.

use crate::cli::{clipboard, output};
use crate::cli::{Cli, Context};
use crate::errors::Result;
use crate::password::{self, GeneratorOptions};

/// Execute the `generate` command.
pub fn execute(
    cli: &Cli,
    size: Option<usize>,
    no_symbols: bool,
    exclude: &str,
    copy: bool,
) -> Result<()> {
    let ctx = Context::load(cli)?;
    let options = options_from_flags(ctx.generator_options(), size, no_symbols, exclude);

    let generated = password::generate(&options)?;

    if copy {
        clipboard::copy(&generated)?;
        output::success(&format!(
            "Copied a {}-character password to the clipboard",
            options.size
        ));
    } else {
        println!("{}", generated.as_str());
    }

    Ok(())
}

/// Apply command-line flags on top of the configured defaults.
fn options_from_flags(
    defaults: GeneratorOptions,
    size: Option<usize>,
    no_symbols: bool,
    exclude: &str,
) -> GeneratorOptions {
    GeneratorOptions {
        size: size.unwrap_or(defaults.size),
        symbols: defaults.symbols && !no_symbols,
        exclude: exclude.to_string(),
        ..defaults
    }
}
