//! Master password strength rules.
//!
//! The same threshold applies when a vault is created and when its
//! master password is changed.

use std::fmt;

use crate::errors::{PassVaultError, Result};

/// Minimum master password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 12;

/// A strength rule a password fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weakness {
    TooShort,
    NoDigit,
    NoUppercase,
    NoLowercase,
    NoSymbol,
}

impl fmt::Display for Weakness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort => write!(f, "at least {MIN_PASSWORD_LEN} characters"),
            Self::NoDigit => f.write_str("a digit"),
            Self::NoUppercase => f.write_str("an uppercase letter"),
            Self::NoLowercase => f.write_str("a lowercase letter"),
            Self::NoSymbol => f.write_str("a symbol"),
        }
    }
}

/// List every rule `password` fails, in a stable order.
pub fn weaknesses(password: &str) -> Vec<Weakness> {
    let mut found = Vec::new();
    if password.chars().count() < MIN_PASSWORD_LEN {
        found.push(Weakness::TooShort);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        found.push(Weakness::NoDigit);
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        found.push(Weakness::NoUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        found.push(Weakness::NoLowercase);
    }
    if password.chars().all(|c| c.is_ascii_alphanumeric()) {
        found.push(Weakness::NoSymbol);
    }
    found
}

/// `true` when `password` passes every strength rule.
pub fn is_strong(password: &str) -> bool {
    weaknesses(password).is_empty()
}

/// Like `is_strong`, but as a `Result` for use with `?`.
pub fn ensure_strong(password: &str) -> Result<()> {
    if is_strong(password) {
        Ok(())
    } else {
        Err(PassVaultError::WeakPassword)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_strong_password() {
        assert!(is_strong("Str0ng!Pass123"));
        assert!(is_strong("aB3$aB3$aB3$"));
    }

    #[test]
    fn eleven_chars_is_too_short() {
        assert!(!is_strong("aB3$aB3$aB3"));
        assert_eq!(weaknesses("aB3$aB3$aB3"), vec![Weakness::TooShort]);
    }

    #[test]
    fn each_class_is_required() {
        assert_eq!(weaknesses("Strong!Password"), vec![Weakness::NoDigit]);
        assert_eq!(weaknesses("str0ng!pass123"), vec![Weakness::NoUppercase]);
        assert_eq!(weaknesses("STR0NG!PASS123"), vec![Weakness::NoLowercase]);
        assert_eq!(weaknesses("Str0ngPass1234"), vec![Weakness::NoSymbol]);
    }

    #[test]
    fn non_ascii_counts_as_symbol() {
        assert!(is_strong("Str0ngPass123é"));
    }

    #[test]
    fn empty_fails_everything() {
        assert_eq!(weaknesses("").len(), 5);
        assert!(matches!(ensure_strong(""), Err(PassVaultError::WeakPassword)));
    }
}
