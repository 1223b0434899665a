//! Property tests for the password policy and generator.

use passvault::password::{
    generate, is_strong, weaknesses, GeneratorOptions, Weakness, MIN_PASSWORD_LEN,
};
use proptest::prelude::*;

#[test]
fn legacy_examples() {
    assert!(is_strong("Str0ng!Pass123"));
    assert!(!is_strong("Str0ng!Pas"));
    assert_eq!(
        weaknesses("password"),
        vec![
            Weakness::TooShort,
            Weakness::NoDigit,
            Weakness::NoUppercase,
            Weakness::NoSymbol,
        ]
    );
}

#[test]
fn generator_rejects_impossible_options() {
    let everything_excluded = GeneratorOptions {
        symbols: false,
        exclude: "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789".into(),
        ..GeneratorOptions::default()
    };
    assert!(generate(&everything_excluded).is_err());

    let too_small = GeneratorOptions {
        size: 3,
        ..GeneratorOptions::default()
    };
    assert!(generate(&too_small).is_err());

    let lenient = GeneratorOptions {
        size: 3,
        strict: false,
        ..GeneratorOptions::default()
    };
    assert_eq!(generate(&lenient).unwrap().chars().count(), 3);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn short_passwords_are_never_strong(pw in "\\PC{0,11}") {
        prop_assume!(pw.chars().count() < MIN_PASSWORD_LEN);
        prop_assert!(!is_strong(&pw));
        prop_assert!(weaknesses(&pw).contains(&Weakness::TooShort));
    }

    #[test]
    fn appending_keeps_a_strong_password_strong(suffix in "\\PC{0,40}") {
        let pw = format!("Str0ng!Pass123{suffix}");
        prop_assert!(is_strong(&pw));
    }

    #[test]
    fn strict_generated_passwords_pass_the_policy(size in MIN_PASSWORD_LEN..256usize) {
        let opts = GeneratorOptions { size, ..GeneratorOptions::default() };
        let pw = generate(&opts).unwrap();
        prop_assert_eq!(pw.chars().count(), size);
        prop_assert!(is_strong(&pw));
    }

    #[test]
    fn excluded_characters_never_appear(exclude in "[a-zA-Z0-9!@#$%]{0,20}", size in 8..128usize) {
        let opts = GeneratorOptions {
            size,
            exclude: exclude.clone(),
            ..GeneratorOptions::default()
        };
        let pw = generate(&opts).unwrap();
        prop_assert!(pw.chars().all(|c| !exclude.contains(c)));
    }
}
