//! Session key material.
//!
//! The key derived from the master password lives only in memory, only
//! while the vault is unlocked, and is zeroed as soon as it is dropped.

use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of the derived key (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// A 32-byte symmetric key that zeroes its memory when dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SessionKey {
    bytes: [u8; KEY_LEN],
}

impl SessionKey {
    /// Wrap raw key bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Access the raw key bytes (e.g. to build a cipher).
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    /// Constant-time comparison of two keys.
    pub fn matches(&self, other: &SessionKey) -> bool {
        self.bytes.ct_eq(&other.bytes).into()
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_is_byte_equality() {
        let a = SessionKey::new([0x11; KEY_LEN]);
        let b = SessionKey::new([0x11; KEY_LEN]);
        let c = SessionKey::new([0x12; KEY_LEN]);
        assert!(a.matches(&b));
        assert!(!a.matches(&c));
    }

    #[test]
    fn debug_does_not_leak_bytes() {
        let key = SessionKey::new([0xAB; KEY_LEN]);
        let shown = format!("{key:?}");
        assert!(shown.contains("REDACTED"));
        assert!(!shown.contains("171"));
    }
}
