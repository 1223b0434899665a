//! `passvault` / `passvault menu`: the interactive loop.
//!
//! Creates a vault on first run, asks for the master password, then
//! offers a menu of vault operations until the operator exits.  An idle
//! watchdog locks the vault and ends the process once the session has
//! been quiet for the idle timeout.

use std::fmt;
use std::path::PathBuf;

use console::{style, Term};
use dialoguer::{Confirm, Input, Password, Select};
use zeroize::Zeroizing;

use crate::cli::commands::backup;
use crate::cli::{clipboard, output};
use crate::cli::{
    prompt_new_password, prompt_password, Cli, Context, NEW_PASSWORD_ENV, PASSWORD_ENV,
};
use crate::errors::{PassVaultError, Result};
use crate::password::{self, GeneratorOptions};
use crate::session::Session;
use crate::vault::Credential;

/// Wrong passwords tolerated before the menu gives up.
pub const MAX_UNLOCK_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    CopySecret,
    List,
    Add,
    Remove,
    Generate,
    ShowSecret,
    ShowLastGenerated,
    Backup,
    ChangePassword,
    Exit,
}

impl MenuItem {
    const ALL: [MenuItem; 10] = [
        MenuItem::CopySecret,
        MenuItem::List,
        MenuItem::Add,
        MenuItem::Remove,
        MenuItem::Generate,
        MenuItem::ShowSecret,
        MenuItem::ShowLastGenerated,
        MenuItem::Backup,
        MenuItem::ChangePassword,
        MenuItem::Exit,
    ];
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MenuItem::CopySecret => "Copy a secret to the clipboard",
            MenuItem::List => "List credentials",
            MenuItem::Add => "Add a credential",
            MenuItem::Remove => "Remove a credential",
            MenuItem::Generate => "Generate a password",
            MenuItem::ShowSecret => "Show a secret",
            MenuItem::ShowLastGenerated => "Show the last generated password",
            MenuItem::Backup => "Back up the vault",
            MenuItem::ChangePassword => "Change the master password",
            MenuItem::Exit => "Exit",
        };
        f.write_str(label)
    }
}

/// State kept between menu actions.
struct Menu<'a> {
    ctx: &'a Context,
    session: Session,
    last_generated: Option<Zeroizing<String>>,
}

/// Execute the interactive menu.
pub fn execute(cli: &Cli) -> Result<()> {
    let ctx = Context::load(cli)?;
    let mut session = ctx.open_session()?;

    if !session.vault_exists() {
        output::info("No vault found, let's create one.");
        let password = prompt_new_password(PASSWORD_ENV, "Choose a master password")?;
        session.create(&password)?;
        ctx.audit("create", None, None);
        output::success(&format!("Vault created at {}", ctx.vault_path.display()));
    }

    let mut menu = Menu {
        ctx: &ctx,
        session,
        last_generated: None,
    };
    menu.run()
}

impl Menu<'_> {
    fn run(&mut self) -> Result<()> {
        loop {
            if self.session.is_locked() {
                self.unlock()?;
            }

            let choice = Select::new()
                .with_prompt("What would you like to do?")
                .items(&MenuItem::ALL)
                .default(0)
                .interact_opt()
                .map_err(prompt_failed)?;

            let item = match choice {
                Some(index) => MenuItem::ALL[index],
                None => MenuItem::Exit,
            };
            if item == MenuItem::Exit {
                break;
            }

            match self.dispatch(item) {
                Ok(()) => {}
                Err(PassVaultError::VaultLocked) => {
                    output::warning("The vault locked itself after a period of inactivity.");
                }
                Err(PassVaultError::UserCancelled) => output::info("Cancelled."),
                Err(e) => output::error(&e.to_string()),
            }
        }

        self.session.stop_watchdog();
        self.session.lock();
        output::info("Vault locked. Bye!");
        Ok(())
    }

    /// Ask for the master password, at most `MAX_UNLOCK_ATTEMPTS` times.
    fn unlock(&mut self) -> Result<()> {
        for attempt in 1..=MAX_UNLOCK_ATTEMPTS {
            let password = prompt_password()?;
            match self.session.unlock(&password) {
                Ok(()) => {
                    self.ctx.audit("unlock", None, None);
                    self.start_watchdog();
                    output::success(&format!(
                        "Vault unlocked ({} credential(s))",
                        self.session.credential_count()?
                    ));
                    return Ok(());
                }
                Err(PassVaultError::AuthFailure) => {
                    self.ctx.audit("unlock-failed", None, None);
                    if attempt < MAX_UNLOCK_ATTEMPTS {
                        output::warning("Wrong password, try again.");
                    }
                }
                Err(e) => return Err(e),
            }
        }
        Err(PassVaultError::AuthFailure)
    }

    fn start_watchdog(&mut self) {
        let secs = self.session.idle_timeout().as_secs();
        self.session.start_watchdog(move || {
            let _ = Term::stderr().show_cursor();
            eprintln!();
            output::warning(&format!("No activity for {secs}s, the vault has been locked."));
            std::process::exit(0);
        });
    }

    fn dispatch(&mut self, item: MenuItem) -> Result<()> {
        match item {
            MenuItem::CopySecret => self.copy_secret(),
            MenuItem::List => self.list(),
            MenuItem::Add => self.add(),
            MenuItem::Remove => self.remove(),
            MenuItem::Generate => self.generate(),
            MenuItem::ShowSecret => self.show_secret(),
            MenuItem::ShowLastGenerated => {
                self.show_last_generated();
                Ok(())
            }
            MenuItem::Backup => self.backup(),
            MenuItem::ChangePassword => self.change_password(),
            MenuItem::Exit => Ok(()),
        }
    }

    // ------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------

    fn copy_secret(&mut self) -> Result<()> {
        let credential = self.pick_credential("Copy which secret?")?;
        clipboard::copy(&credential.secret)?;
        output::success(&format!(
            "Copied the secret of '{}' to the clipboard",
            credential.identifier
        ));
        Ok(())
    }

    fn list(&mut self) -> Result<()> {
        let credentials = self.session.list_credentials()?;
        output::print_credentials_table(&credentials);
        Ok(())
    }

    fn add(&mut self) -> Result<()> {
        let identifier: String = Input::new()
            .with_prompt("Identifier")
            .interact_text()
            .map_err(prompt_failed)?;
        let identifier = identifier.trim().to_string();
        crate::vault::credential::validate_identifier(&identifier)?;

        let key: String = Input::new()
            .with_prompt("Key / login")
            .allow_empty(true)
            .interact_text()
            .map_err(prompt_failed)?;
        let website: String = Input::new()
            .with_prompt("Website")
            .allow_empty(true)
            .interact_text()
            .map_err(prompt_failed)?;

        let generate = Confirm::new()
            .with_prompt("Generate a random secret?")
            .default(true)
            .interact()
            .map_err(prompt_failed)?;
        let secret = if generate {
            password::generate(&self.ctx.generator_options())?
        } else {
            Zeroizing::new(
                Password::new()
                    .with_prompt(format!("Secret for {identifier}"))
                    .with_confirmation("Provide the same secret again", "Secrets do not match")
                    .interact()
                    .map_err(prompt_failed)?,
            )
        };

        let credential = Credential::new(identifier.as_str(), key, secret.as_str(), website);
        self.session.add_credential(credential)?;

        self.ctx.audit("add", Some(&identifier), None);
        output::success(&format!("Stored '{identifier}'"));
        Ok(())
    }

    fn remove(&mut self) -> Result<()> {
        let credential = self.pick_credential("Remove which credential?")?;
        let confirmed = Confirm::new()
            .with_prompt(format!("Remove credential '{}'?", credential.identifier))
            .default(false)
            .interact()
            .map_err(prompt_failed)?;
        if !confirmed {
            return Err(PassVaultError::UserCancelled);
        }

        self.session.remove_credential(&credential.identifier)?;
        self.ctx.audit("remove", Some(&credential.identifier), None);
        output::success(&format!("Removed credential '{}'", credential.identifier));
        Ok(())
    }

    fn generate(&mut self) -> Result<()> {
        let defaults = self.ctx.generator_options();
        let size: usize = Input::new()
            .with_prompt("Length")
            .default(defaults.size)
            .interact_text()
            .map_err(prompt_failed)?;
        let symbols = Confirm::new()
            .with_prompt("Include symbols?")
            .default(defaults.symbols)
            .interact()
            .map_err(prompt_failed)?;
        let exclude: String = Input::new()
            .with_prompt("Characters to exclude")
            .allow_empty(true)
            .interact_text()
            .map_err(prompt_failed)?;

        let options = GeneratorOptions {
            size,
            symbols,
            exclude,
            ..defaults
        };
        let generated = password::generate(&options)?;
        println!("{}", style(generated.as_str()).bold());

        let copy = Confirm::new()
            .with_prompt("Copy it to the clipboard?")
            .default(true)
            .interact()
            .map_err(prompt_failed)?;
        if copy {
            clipboard::copy(&generated)?;
            output::success("Copied to the clipboard");
        }

        self.last_generated = Some(generated);
        Ok(())
    }

    fn show_secret(&mut self) -> Result<()> {
        let credential = self.pick_credential("Show which credential?")?;
        output::print_credential(&credential);
        Ok(())
    }

    fn show_last_generated(&self) {
        match &self.last_generated {
            Some(generated) => println!("{}", style(generated.as_str()).bold()),
            None => output::info("No password generated in this session yet."),
        }
    }

    fn backup(&mut self) -> Result<()> {
        let default_dest = backup::default_dest(self.ctx);
        let dest: String = Input::new()
            .with_prompt("Backup directory")
            .default(default_dest.display().to_string())
            .interact_text()
            .map_err(prompt_failed)?;

        let written = self.session.backup(&PathBuf::from(dest))?;
        self.ctx.audit("backup", None, Some(&written.display().to_string()));
        output::success(&format!("Backup written to {}", written.display()));
        Ok(())
    }

    fn change_password(&mut self) -> Result<()> {
        let current = Zeroizing::new(
            Password::new()
                .with_prompt("Current master password")
                .interact()
                .map_err(prompt_failed)?,
        );
        if !self.session.check_current_password(&current)? {
            return Err(PassVaultError::PasswordMismatch);
        }

        let new_password = prompt_new_password(NEW_PASSWORD_ENV, "New master password")?;
        self.session.change_master_password(&new_password)?;

        self.ctx.audit("change-password", None, None);
        output::success("Master password changed");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    /// Let the operator choose one stored credential.
    fn pick_credential(&mut self, prompt: &str) -> Result<Credential> {
        let credentials = self.session.list_credentials()?;
        if credentials.is_empty() {
            output::info("No credentials in this vault yet.");
            return Err(PassVaultError::UserCancelled);
        }

        let labels: Vec<String> = credentials
            .iter()
            .map(|c| {
                if c.website.is_empty() {
                    c.identifier.clone()
                } else {
                    format!("{} ({})", c.identifier, c.website)
                }
            })
            .collect();

        let index = Select::new()
            .with_prompt(prompt)
            .items(&labels)
            .default(0)
            .interact_opt()
            .map_err(prompt_failed)?
            .ok_or(PassVaultError::UserCancelled)?;

        // Re-read through the session so the idle check applies.
        self.session.find_credential(&credentials[index].identifier)
    }
}

fn prompt_failed(e: dialoguer::Error) -> PassVaultError {
    PassVaultError::CommandFailed(format!("prompt: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_is_the_last_entry() {
        assert_eq!(MenuItem::ALL.last(), Some(&MenuItem::Exit));
    }

    #[test]
    fn every_entry_has_a_distinct_label() {
        let mut labels: Vec<String> = MenuItem::ALL.iter().map(ToString::to_string).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), MenuItem::ALL.len());
    }
}
