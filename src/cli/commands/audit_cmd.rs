//! `passvault audit`: display the audit log.
//!
//! Usage:
//!   passvault audit              # show last 50 entries
//!   passvault audit --last 20    # show last 20

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::audit::{self, AuditEntry};
use crate::cli::output;
use crate::cli::{Cli, Context};
use crate::errors::Result;

/// Execute the `audit` command.
pub fn execute(cli: &Cli, last: usize) -> Result<()> {
    let ctx = Context::load(cli)?;
    let entries = audit::recent_entries(ctx.vault_dir(), last)?;

    if entries.is_empty() {
        output::info("No audit entries found.");
        return Ok(());
    }

    print_audit_table(&entries);

    Ok(())
}

/// Print audit entries in a formatted table.
pub fn print_audit_table(entries: &[AuditEntry]) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time", "Operation", "Identifier", "Details"]);

    for entry in entries {
        let time = entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string();
        table.add_row(vec![
            time,
            colorize_operation(&entry.operation),
            entry.identifier.as_deref().unwrap_or("-").to_string(),
            entry.details.as_deref().unwrap_or("-").to_string(),
        ]);
    }

    println!(
        "{}",
        style(format!("{} audit entries:", entries.len())).bold()
    );
    println!("{table}");
}

/// Colorize operation names for display.
fn colorize_operation(op: &str) -> String {
    match op {
        "create" | "unlock" => style(op).green().to_string(),
        "add" => style(op).blue().to_string(),
        "remove" | "unlock-failed" => style(op).red().to_string(),
        "change-password" => style(op).yellow().to_string(),
        "backup" => style(op).cyan().to_string(),
        _ => op.to_string(),
    }
}
