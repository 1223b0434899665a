//! CLI module: Clap argument parser, prompts, output helpers, and command implementations.

pub mod clipboard;
pub mod commands;
pub mod output;

use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::settings::VAULT_DIR_ENV;
use crate::config::Settings;
use crate::errors::{PassVaultError, Result};
use crate::password::{self, GeneratorOptions};
use crate::session::Session;
use crate::vault::VaultEngine;

/// Environment variable holding the master password (scripted use).
pub const PASSWORD_ENV: &str = "PASSVAULT_PASSWORD";

/// Environment variable holding the new master password for `passwd`.
pub const NEW_PASSWORD_ENV: &str = "PASSVAULT_NEW_PASSWORD";

/// PassVault CLI: encrypted credential vault.
#[derive(Parser)]
#[command(
    name = "passvault",
    about = "Encrypted credential vault for the terminal",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding the vault file (default: per-user config directory)
    #[arg(long, env = VAULT_DIR_ENV, global = true)]
    pub vault_dir: Option<PathBuf>,

    /// Seconds of inactivity before the vault locks itself
    #[arg(long, global = true)]
    pub idle_timeout: Option<u64>,

    /// Print debug diagnostics to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// All available subcommands.  Without one, the interactive menu starts.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Start the interactive menu (default)
    Menu,

    /// Create a new vault
    Init,

    /// List all credentials (secrets hidden)
    List,

    /// Store a new credential
    Add {
        /// Unique identifier (e.g. amazon)
        identifier: String,
        /// Login or username
        #[arg(short, long, default_value = "")]
        key: String,
        /// Website the credential belongs to
        #[arg(short, long, default_value = "")]
        website: String,
        /// Generate a strong random secret instead of prompting
        #[arg(short, long)]
        generate: bool,
    },

    /// Remove a credential
    Remove {
        /// Credential identifier
        identifier: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Print a credential including its secret
    Show {
        /// Credential identifier
        identifier: String,
    },

    /// Copy a credential's secret to the clipboard
    Copy {
        /// Credential identifier
        identifier: String,
    },

    /// Generate a strong random password
    Generate {
        /// Number of characters
        #[arg(short, long)]
        size: Option<usize>,
        /// Leave out symbols
        #[arg(long)]
        no_symbols: bool,
        /// Characters that must not appear
        #[arg(short, long, default_value = "")]
        exclude: String,
        /// Copy to the clipboard instead of printing
        #[arg(short, long)]
        copy: bool,
    },

    /// Change the vault's master password
    Passwd,

    /// Copy the encrypted vault file to a backup directory
    Backup {
        /// Destination directory (default: <vault_dir>/backups)
        #[arg(short, long)]
        dest: Option<PathBuf>,
    },

    /// View the audit log of vault operations
    Audit {
        /// Number of entries to show (default: 50)
        #[arg(long, default_value = "50")]
        last: usize,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        shell: String,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Resolved settings and paths for one CLI invocation.
#[derive(Debug, Clone)]
pub struct Context {
    pub settings: Settings,
    pub vault_path: PathBuf,
    pub idle_timeout: Duration,
}

impl Context {
    /// Load `config.toml` and resolve the vault location.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_dir = Settings::default_dir();
        let settings = match &config_dir {
            Ok(dir) => Settings::load(dir)?,
            Err(_) => Settings::default(),
        };

        let vault_path = match (&config_dir, cli.vault_dir.as_deref()) {
            (Ok(dir), override_dir) => settings.vault_path(dir, override_dir),
            (Err(_), Some(dir)) => settings.vault_path(dir, None),
            (Err(e), None) => match &settings.vault_dir {
                Some(dir) => settings.vault_path(dir, None),
                None => return Err(PassVaultError::ConfigError(e.to_string())),
            },
        };

        let idle_timeout = match cli.idle_timeout {
            Some(0) => {
                return Err(PassVaultError::ConfigError(
                    "--idle-timeout must be at least 1 second".into(),
                ))
            }
            Some(secs) => Duration::from_secs(secs),
            None => settings.idle_timeout(),
        };

        Ok(Self {
            settings,
            vault_path,
            idle_timeout,
        })
    }

    /// Directory holding the vault file (and the audit database).
    pub fn vault_dir(&self) -> &Path {
        self.vault_path.parent().unwrap_or(Path::new("."))
    }

    /// A locked session over the configured vault.
    pub fn open_session(&self) -> Result<Session> {
        let engine = VaultEngine::new(&self.vault_path, self.settings.argon2_params())?;
        Ok(Session::new(engine, self.idle_timeout))
    }

    /// A session unlocked with the operator's master password.
    pub fn unlock_session(&self) -> Result<Session> {
        let mut session = self.open_session()?;
        if !session.vault_exists() {
            return Err(PassVaultError::VaultNotFound(self.vault_path.clone()));
        }

        let password = prompt_password()?;
        let unlocked = session.unlock(&password);
        if let Err(PassVaultError::AuthFailure) = unlocked {
            self.audit("unlock-failed", None, None);
        }
        unlocked?;
        Ok(session)
    }

    /// Record an operation in the audit log.  Never fails.
    pub fn audit(&self, op: &str, identifier: Option<&str>, details: Option<&str>) {
        crate::audit::log_audit(self.vault_dir(), op, identifier, details);
    }

    /// Generator options from the config file.
    pub fn generator_options(&self) -> GeneratorOptions {
        self.settings.generator_options()
    }
}

/// Get the master password, trying in order:
/// 1. `PASSVAULT_PASSWORD` env var (scripts)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Master password")
        .interact()
        .map_err(|e| PassVaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new master password with confirmation.
///
/// Respects `env_var` for scripted usage.  Keeps asking until the
/// password passes the strength policy.
pub fn prompt_new_password(env_var: &str, prompt: &str) -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(env_var) {
        if !pw.is_empty() {
            let pw = Zeroizing::new(pw);
            password::ensure_strong(&pw)?;
            return Ok(pw);
        }
    }

    loop {
        let pw = Zeroizing::new(
            dialoguer::Password::new()
                .with_prompt(prompt)
                .with_confirmation(
                    "Type it again so we can be sure there are no mistakes",
                    "Passwords do not match, try again",
                )
                .interact()
                .map_err(|e| PassVaultError::CommandFailed(format!("password prompt: {e}")))?,
        );

        let weaknesses = password::weaknesses(&pw);
        if weaknesses.is_empty() {
            return Ok(pw);
        }

        let missing: Vec<String> = weaknesses.iter().map(ToString::to_string).collect();
        output::warning(&format!(
            "Your password is too weak! It needs {}.",
            missing.join(", ")
        ));
    }
}

/// Read a credential secret, trying in order:
/// 1. Piped input (stdin is not a terminal)
/// 2. Interactive prompt with confirmation
pub fn prompt_secret(identifier: &str) -> Result<Zeroizing<String>> {
    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        let trimmed = Zeroizing::new(buf.trim_end().to_string());
        if trimmed.is_empty() {
            return Err(PassVaultError::InvalidCredential(
                "secret value cannot be empty".into(),
            ));
        }
        return Ok(trimmed);
    }

    let secret = dialoguer::Password::new()
        .with_prompt(format!("Secret for {identifier}"))
        .with_confirmation("Provide the same secret again", "Secrets do not match")
        .interact()
        .map_err(|e| PassVaultError::CommandFailed(format!("secret prompt: {e}")))?;
    Ok(Zeroizing::new(secret))
}

/// Ask a yes/no question.
pub fn confirm(prompt: &str, default: bool) -> Result<bool> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(|e| PassVaultError::CommandFailed(format!("confirm prompt: {e}")))
}

/// Stop the process from writing core dumps that could contain key material.
pub fn harden_process() {
    #[cfg(unix)]
    {
        let rlim = libc::rlimit {
            rlim_cur: 0,
            rlim_max: 0,
        };
        // SAFETY: setrlimit only reads the struct we pass in.
        let rc = unsafe { libc::setrlimit(libc::RLIMIT_CORE, &rlim) };
        if rc != 0 {
            tracing::debug!("could not disable core dumps");
        }
    }
}
