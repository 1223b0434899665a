use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in PassVault.
#[derive(Debug, Error)]
pub enum PassVaultError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed")]
    DecryptionFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Vault errors ---
    #[error("Vault not found at {0}")]
    VaultNotFound(PathBuf),

    #[error("Vault already exists at {0}")]
    VaultAlreadyExists(PathBuf),

    #[error("Vault at {0} is already open in this process")]
    VaultInUse(PathBuf),

    #[error("Invalid vault format: {0}")]
    InvalidVaultFormat(String),

    #[error("Wrong password or corrupted vault file")]
    AuthFailure,

    #[error("The vault is locked")]
    VaultLocked,

    // --- Credential errors ---
    #[error("A credential with identifier '{0}' already exists")]
    DuplicateIdentifier(String),

    #[error("Credential '{0}' not found")]
    CredentialNotFound(String),

    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    // --- Password errors ---
    #[error(
        "Password is too weak: it must be at least {min} characters and contain upper and lower case letters, digits and symbols",
        min = crate::password::MIN_PASSWORD_LEN
    )]
    WeakPassword,

    #[error("The new password must differ from the current one")]
    PasswordUnchanged,

    #[error("Invalid generator options: {0}")]
    InvalidGeneratorOptions(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,

    #[error("Password mismatch: the current master password is incorrect")]
    PasswordMismatch,

    #[error("Audit error: {0}")]
    AuditError(String),
}

/// Convenience type alias for PassVault results.
pub type Result<T> = std::result::Result<T, PassVaultError>;
