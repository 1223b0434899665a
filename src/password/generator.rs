//! Random password generation for new credentials.
//!
//! Characters are drawn with `rand::rng()`, a ChaCha-based CSPRNG seeded
//! from the operating system.

use rand::seq::SliceRandom;
use rand::Rng;
use zeroize::Zeroizing;

use crate::errors::{PassVaultError, Result};

pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const DIGITS: &str = "0123456789";
pub const SYMBOLS: &str = "!@#$%^&*()+_-=}{[]|:;\"/?.><,`~";

/// Longest password `generate` will produce.
pub const MAX_SIZE: usize = 1024;

/// What to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Number of characters.
    pub size: usize,
    /// Include the symbol class.
    pub symbols: bool,
    /// Characters that must never appear.
    pub exclude: String,
    /// Guarantee at least one character of every included class.
    pub strict: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            size: 18,
            symbols: true,
            exclude: String::new(),
            strict: true,
        }
    }
}

impl GeneratorOptions {
    /// The character classes left after exclusions, empty ones dropped.
    fn classes(&self) -> Vec<Vec<char>> {
        let mut sets = vec![LOWERCASE, UPPERCASE, DIGITS];
        if self.symbols {
            sets.push(SYMBOLS);
        }

        sets.into_iter()
            .map(|set| {
                set.chars()
                    .filter(|c| !self.exclude.contains(*c))
                    .collect::<Vec<_>>()
            })
            .filter(|class| !class.is_empty())
            .collect()
    }
}

/// Generate a random password according to `options`.
pub fn generate(options: &GeneratorOptions) -> Result<Zeroizing<String>> {
    if options.size == 0 {
        return Err(PassVaultError::InvalidGeneratorOptions(
            "size must be at least 1".into(),
        ));
    }
    if options.size > MAX_SIZE {
        return Err(PassVaultError::InvalidGeneratorOptions(format!(
            "size cannot exceed {MAX_SIZE}"
        )));
    }

    let classes = options.classes();
    if classes.is_empty() {
        return Err(PassVaultError::InvalidGeneratorOptions(
            "every character is excluded".into(),
        ));
    }
    if options.strict && options.size < classes.len() {
        return Err(PassVaultError::InvalidGeneratorOptions(format!(
            "size must be at least {} to include every character class",
            classes.len()
        )));
    }

    let pool: Vec<char> = classes.iter().flatten().copied().collect();
    let mut rng = rand::rng();
    let mut chars = Vec::with_capacity(options.size);

    if options.strict {
        for class in &classes {
            chars.push(class[rng.random_range(0..class.len())]);
        }
    }
    while chars.len() < options.size {
        chars.push(pool[rng.random_range(0..pool.len())]);
    }
    chars.shuffle(&mut rng);

    Ok(Zeroizing::new(chars.into_iter().collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_match_legacy_defaults() {
        let opts = GeneratorOptions::default();
        assert_eq!(opts.size, 18);
        assert!(opts.symbols);
        assert!(opts.strict);
        assert_eq!(generate(&opts).unwrap().chars().count(), 18);
    }

    #[test]
    fn strict_includes_every_class() {
        let opts = GeneratorOptions {
            size: 4,
            ..GeneratorOptions::default()
        };
        for _ in 0..50 {
            let pw = generate(&opts).unwrap();
            assert!(pw.chars().any(|c| c.is_ascii_lowercase()));
            assert!(pw.chars().any(|c| c.is_ascii_uppercase()));
            assert!(pw.chars().any(|c| c.is_ascii_digit()));
            assert!(pw.chars().any(|c| SYMBOLS.contains(c)));
        }
    }

    #[test]
    fn no_symbols_when_disabled() {
        let opts = GeneratorOptions {
            size: 64,
            symbols: false,
            ..GeneratorOptions::default()
        };
        let pw = generate(&opts).unwrap();
        assert!(pw.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn excluding_a_whole_class_drops_it() {
        let opts = GeneratorOptions {
            size: 32,
            symbols: false,
            exclude: DIGITS.to_string(),
            ..GeneratorOptions::default()
        };
        let pw = generate(&opts).unwrap();
        assert!(pw.chars().all(|c| c.is_ascii_alphabetic()));
    }

    #[test]
    fn invalid_options() {
        let zero = GeneratorOptions {
            size: 0,
            ..GeneratorOptions::default()
        };
        assert!(generate(&zero).is_err());

        let too_small = GeneratorOptions {
            size: 3,
            ..GeneratorOptions::default()
        };
        assert!(generate(&too_small).is_err());

        let everything = GeneratorOptions {
            symbols: false,
            exclude: format!("{LOWERCASE}{UPPERCASE}{DIGITS}"),
            ..GeneratorOptions::default()
        };
        assert!(matches!(
            generate(&everything),
            Err(PassVaultError::InvalidGeneratorOptions(_))
        ));
    }

    #[test]
    fn non_strict_allows_tiny_sizes() {
        let opts = GeneratorOptions {
            size: 1,
            strict: false,
            ..GeneratorOptions::default()
        };
        assert_eq!(generate(&opts).unwrap().chars().count(), 1);
    }
}
