use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::crypto::kdf::Argon2Params;
use crate::errors::{PassVaultError, Result};
use crate::password::GeneratorOptions;

/// Name of the directory PassVault keeps its files in.
pub const APP_DIR_NAME: &str = "passvault";

/// Environment variable overriding the vault directory.
pub const VAULT_DIR_ENV: &str = "PASSVAULT_DIR";

/// User-level configuration, loaded from `<config_dir>/passvault/config.toml`.
///
/// Every field has a sensible default so PassVault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory holding `vault.json` (default: the config directory).
    #[serde(default)]
    pub vault_dir: Option<PathBuf>,

    /// Seconds of inactivity before the vault locks itself.
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,

    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,

    /// Default length of generated passwords.
    #[serde(default = "default_generator_size")]
    pub generator_size: usize,

    /// Whether generated passwords include symbols by default.
    #[serde(default = "default_generator_symbols")]
    pub generator_symbols: bool,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_idle_timeout_secs() -> u64 {
    60
}

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

fn default_generator_size() -> usize {
    18
}

fn default_generator_symbols() -> bool {
    true
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_dir: None,
            idle_timeout_secs: default_idle_timeout_secs(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
            generator_size: default_generator_size(),
            generator_symbols: default_generator_symbols(),
        }
    }
}

impl Settings {
    /// Name of the config file inside the app directory.
    const FILE_NAME: &'static str = "config.toml";

    /// Name of the vault file inside the vault directory.
    pub const VAULT_FILE_NAME: &'static str = "vault.json";

    /// Load settings from `<config_dir>/config.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            PassVaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        if settings.idle_timeout_secs == 0 {
            return Err(PassVaultError::ConfigError(format!(
                "{}: idle_timeout_secs must be at least 1",
                config_path.display()
            )));
        }

        Ok(settings)
    }

    /// The per-user PassVault directory, e.g. `~/.config/passvault`.
    pub fn default_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or_else(|| {
                PassVaultError::ConfigError("cannot determine the user config directory".into())
            })
    }

    /// Resolve where the vault lives.
    ///
    /// Precedence: explicit override (CLI flag or `PASSVAULT_DIR`), then
    /// `vault_dir` from the config file, then `config_dir`.
    pub fn vault_path(&self, config_dir: &Path, override_dir: Option<&Path>) -> PathBuf {
        let dir = override_dir
            .map(Path::to_path_buf)
            .or_else(|| self.vault_dir.clone())
            .unwrap_or_else(|| config_dir.to_path_buf());
        dir.join(Self::VAULT_FILE_NAME)
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Generator options seeded from the configured defaults.
    pub fn generator_options(&self) -> GeneratorOptions {
        GeneratorOptions {
            size: self.generator_size,
            symbols: self.generator_symbols,
            ..GeneratorOptions::default()
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.vault_dir, None);
        assert_eq!(s.idle_timeout_secs, 60);
        assert_eq!(s.argon2_memory_kib, 65_536);
        assert_eq!(s.argon2_iterations, 3);
        assert_eq!(s.argon2_parallelism, 4);
        assert_eq!(s.generator_size, 18);
        assert!(s.generator_symbols);
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.idle_timeout_secs, 60);
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
vault_dir = "/srv/vaults"
idle_timeout_secs = 300
argon2_memory_kib = 131072
argon2_iterations = 5
argon2_parallelism = 8
generator_size = 32
generator_symbols = false
"#;
        fs::write(tmp.path().join("config.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.vault_dir, Some(PathBuf::from("/srv/vaults")));
        assert_eq!(settings.idle_timeout(), Duration::from_secs(300));
        assert_eq!(settings.argon2_params().memory_kib, 131_072);
        assert_eq!(settings.argon2_params().iterations, 5);
        assert_eq!(settings.argon2_params().parallelism, 8);
        assert_eq!(settings.generator_options().size, 32);
        assert!(!settings.generator_options().symbols);
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "idle_timeout_secs = 10\n").unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.idle_timeout_secs, 10);
        assert_eq!(settings.argon2_iterations, 3);
        assert_eq!(settings.generator_size, 18);
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "not valid {{toml").unwrap();
        assert!(Settings::load(tmp.path()).is_err());
    }

    #[test]
    fn load_rejects_zero_idle_timeout() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "idle_timeout_secs = 0\n").unwrap();
        assert!(matches!(
            Settings::load(tmp.path()),
            Err(PassVaultError::ConfigError(_))
        ));
    }

    #[test]
    fn vault_path_precedence() {
        let config_dir = Path::new("/home/user/.config/passvault");
        let mut s = Settings::default();

        assert_eq!(
            s.vault_path(config_dir, None),
            PathBuf::from("/home/user/.config/passvault/vault.json")
        );

        s.vault_dir = Some(PathBuf::from("/data"));
        assert_eq!(
            s.vault_path(config_dir, None),
            PathBuf::from("/data/vault.json")
        );

        assert_eq!(
            s.vault_path(config_dir, Some(Path::new("/tmp/v"))),
            PathBuf::from("/tmp/v/vault.json")
        );
    }
}
