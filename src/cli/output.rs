//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::vault::Credential;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Placeholder shown instead of a secret.
pub const MASK: &str = "********";

/// Print a table of credentials (Identifier, Key, Website, Secret) with
/// every secret masked.
pub fn print_credentials_table(credentials: &[Credential]) {
    if credentials.is_empty() {
        info("No credentials in this vault yet.");
        tip("Run `passvault add <IDENTIFIER>` to add your first credential.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Identifier", "Key", "Website", "Secret"]);

    for c in credentials {
        table.add_row(vec![
            c.identifier.clone(),
            or_dash(&c.key),
            or_dash(&c.website),
            MASK.to_string(),
        ]);
    }

    println!("{table}");
    println!(
        "{}",
        style(format!("{} credential(s)", credentials.len())).dim()
    );
}

/// Print one credential including its secret.
pub fn print_credential(credential: &Credential) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.add_row(vec!["Identifier".to_string(), credential.identifier.clone()]);
    table.add_row(vec!["Key".to_string(), or_dash(&credential.key)]);
    table.add_row(vec!["Website".to_string(), or_dash(&credential.website)]);
    table.add_row(vec!["Secret".to_string(), credential.secret.clone()]);
    println!("{table}");
}

fn or_dash(value: &str) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fields_render_as_dash() {
        assert_eq!(or_dash(""), "-");
        assert_eq!(or_dash("bob"), "bob");
    }
}
