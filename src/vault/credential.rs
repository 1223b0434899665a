//! Credential and CredentialCollection types stored inside a vault.
//!
//! The whole collection is serialized to JSON and sealed as one blob.
//! The JSON shape (`totalItems`, `credentials`) matches the files written
//! by earlier PassVault releases.

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{PassVaultError, Result};

/// Shortest identifier accepted for a credential.
pub const MIN_IDENTIFIER_LEN: usize = 2;

/// Longest identifier accepted for a credential.
pub const MAX_IDENTIFIER_LEN: usize = 128;

/// A single named credential.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Credential {
    /// Unique name of the credential (e.g. "amazon").
    pub identifier: String,

    /// Login or username; may be empty.
    #[serde(default)]
    pub key: String,

    /// The secret value itself.
    pub secret: String,

    /// Website the credential belongs to; may be empty.
    #[serde(default)]
    pub website: String,
}

impl Credential {
    pub fn new(
        identifier: impl Into<String>,
        key: impl Into<String>,
        secret: impl Into<String>,
        website: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            key: key.into(),
            secret: secret.into(),
            website: website.into(),
        }
    }

    /// Check the fields a new credential must satisfy before it is stored.
    pub fn validate(&self) -> Result<()> {
        validate_identifier(&self.identifier)?;
        if self.secret.is_empty() {
            return Err(PassVaultError::InvalidCredential(
                "secret value cannot be empty".into(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("identifier", &self.identifier)
            .field("key", &self.key)
            .field("secret", &"[REDACTED]")
            .field("website", &self.website)
            .finish()
    }
}

/// Validate a credential identifier.
///
/// Must be 2..=128 characters with no leading or trailing whitespace,
/// so every lookup matches the stored name exactly.
pub fn validate_identifier(identifier: &str) -> Result<()> {
    if identifier.trim() != identifier {
        return Err(PassVaultError::InvalidCredential(
            "identifier cannot start or end with whitespace".into(),
        ));
    }
    let len = identifier.chars().count();
    if len < MIN_IDENTIFIER_LEN {
        return Err(PassVaultError::InvalidCredential(format!(
            "identifier must be at least {MIN_IDENTIFIER_LEN} characters"
        )));
    }
    if len > MAX_IDENTIFIER_LEN {
        return Err(PassVaultError::InvalidCredential(format!(
            "identifier cannot exceed {MAX_IDENTIFIER_LEN} characters"
        )));
    }
    Ok(())
}

/// The decrypted content of a vault: an ordered list of credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialCollection {
    total_items: usize,
    credentials: Vec<Credential>,
}

impl CredentialCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of credentials.
    pub fn len(&self) -> usize {
        self.total_items
    }

    pub fn is_empty(&self) -> bool {
        self.total_items == 0
    }

    /// Credentials in insertion order.
    pub fn credentials(&self) -> &[Credential] {
        &self.credentials
    }

    pub fn get(&self, identifier: &str) -> Option<&Credential> {
        self.credentials.iter().find(|c| c.identifier == identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.get(identifier).is_some()
    }

    /// Append a credential, rejecting duplicate identifiers.
    pub fn push(&mut self, credential: Credential) -> Result<()> {
        if self.contains(&credential.identifier) {
            return Err(PassVaultError::DuplicateIdentifier(
                credential.identifier.clone(),
            ));
        }
        self.credentials.push(credential);
        self.total_items += 1;
        Ok(())
    }

    /// Remove a credential by identifier, returning it.
    pub fn remove(&mut self, identifier: &str) -> Result<Credential> {
        let index = self
            .credentials
            .iter()
            .position(|c| c.identifier == identifier)
            .ok_or_else(|| PassVaultError::CredentialNotFound(identifier.to_string()))?;
        self.total_items -= 1;
        Ok(self.credentials.remove(index))
    }

    /// Check the invariants of a collection read back from disk.
    pub fn check_invariants(&self) -> Result<()> {
        if self.total_items != self.credentials.len() {
            return Err(PassVaultError::InvalidVaultFormat(format!(
                "totalItems is {} but {} credentials are stored",
                self.total_items,
                self.credentials.len()
            )));
        }
        for (i, credential) in self.credentials.iter().enumerate() {
            if self.credentials[..i]
                .iter()
                .any(|c| c.identifier == credential.identifier)
            {
                return Err(PassVaultError::InvalidVaultFormat(format!(
                    "duplicate identifier '{}'",
                    credential.identifier
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amazon() -> Credential {
        Credential::new("amazon", "bob", "s3cret", "amazon.com")
    }

    #[test]
    fn push_and_remove_keep_count_in_sync() {
        let mut c = CredentialCollection::new();
        c.push(amazon()).unwrap();
        c.push(Credential::new("github", "", "tok", "")).unwrap();
        assert_eq!(c.len(), 2);

        let removed = c.remove("amazon").unwrap();
        assert_eq!(removed.key, "bob");
        assert_eq!(c.len(), 1);
        assert_eq!(c.credentials()[0].identifier, "github");
        c.check_invariants().unwrap();
    }

    #[test]
    fn push_rejects_duplicates() {
        let mut c = CredentialCollection::new();
        c.push(amazon()).unwrap();
        assert!(matches!(
            c.push(amazon()),
            Err(PassVaultError::DuplicateIdentifier(id)) if id == "amazon"
        ));
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn remove_missing_is_not_found() {
        let mut c = CredentialCollection::new();
        assert!(matches!(
            c.remove("nope"),
            Err(PassVaultError::CredentialNotFound(_))
        ));
    }

    #[test]
    fn json_shape_matches_legacy_files() {
        let mut c = CredentialCollection::new();
        c.push(amazon()).unwrap();
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["totalItems"], 1);
        assert_eq!(json["credentials"][0]["identifier"], "amazon");
        assert_eq!(json["credentials"][0]["website"], "amazon.com");
    }

    #[test]
    fn invariants_catch_bad_count_and_duplicates() {
        let bad_count: CredentialCollection =
            serde_json::from_str(r#"{"totalItems":3,"credentials":[]}"#).unwrap();
        assert!(bad_count.check_invariants().is_err());

        let dup: CredentialCollection = serde_json::from_str(
            r#"{"totalItems":2,"credentials":[
                {"identifier":"aa","key":"","secret":"x","website":""},
                {"identifier":"aa","key":"","secret":"y","website":""}]}"#,
        )
        .unwrap();
        assert!(dup.check_invariants().is_err());
    }

    #[test]
    fn identifier_rules() {
        assert!(validate_identifier("ab").is_ok());
        assert!(validate_identifier("a").is_err());
        assert!(validate_identifier("  a ").is_err());
        assert!(validate_identifier(" ab").is_err());
        assert!(validate_identifier("ab\n").is_err());
        assert!(validate_identifier("my bank").is_ok());
        assert!(validate_identifier(&"x".repeat(129)).is_err());
    }

    #[test]
    fn empty_secret_is_invalid() {
        let c = Credential::new("amazon", "bob", "", "");
        assert!(matches!(c.validate(), Err(PassVaultError::InvalidCredential(_))));
    }

    #[test]
    fn debug_redacts_secret() {
        let shown = format!("{:?}", amazon());
        assert!(!shown.contains("s3cret"));
        assert!(shown.contains("amazon"));
    }
}
