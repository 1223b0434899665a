//! Password strength policy and random password generation.

pub mod generator;
pub mod policy;

pub use generator::{generate, GeneratorOptions};
pub use policy::{ensure_strong, is_strong, weaknesses, Weakness, MIN_PASSWORD_LEN};
