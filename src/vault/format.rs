//! On-disk vault envelope format.
//!
//! A vault file is a single JSON document:
//!
//! ```text
//! {
//!   "version": 1,
//!   "kdf": { "algorithm": "argon2id", "memory_kib": 65536, "iterations": 3, "parallelism": 4 },
//!   "salt": "<base64>",
//!   "iv": "<base64>",
//!   "authTag": "<base64>",
//!   "encryptedData": "<base64>"
//! }
//! ```
//!
//! - **version**: envelope format version (currently `1`).
//! - **kdf**: the Argon2id parameters the key was derived with.
//! - **salt**: the Argon2id salt.
//! - **iv**, **authTag**, **encryptedData**: the AES-256-GCM nonce, tag
//!   and ciphertext of the serialized credential collection.

use serde::{Deserialize, Serialize};

use crate::crypto::kdf::Argon2Params;
use crate::crypto::Sealed;
use crate::errors::{PassVaultError, Result};

/// Current envelope format version.
pub const CURRENT_VERSION: u32 = 1;

/// The only key derivation algorithm version 1 knows.
pub const KDF_ALGORITHM: &str = "argon2id";

/// Key derivation metadata stored in the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfHeader {
    pub algorithm: String,
    #[serde(flatten)]
    pub params: Argon2Params,
}

impl KdfHeader {
    pub fn argon2id(params: Argon2Params) -> Self {
        Self {
            algorithm: KDF_ALGORITHM.to_string(),
            params,
        }
    }
}

/// The complete, self-contained encrypted vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub version: u32,

    pub kdf: KdfHeader,

    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub salt: Vec<u8>,

    #[serde(
        rename = "iv",
        serialize_with = "base64_encode",
        deserialize_with = "base64_decode"
    )]
    pub nonce: Vec<u8>,

    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub auth_tag: Vec<u8>,

    #[serde(
        rename = "encryptedData",
        serialize_with = "base64_encode",
        deserialize_with = "base64_decode"
    )]
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Assemble an envelope from a sealed payload and its KDF inputs.
    pub fn new(sealed: Sealed, salt: &[u8], params: Argon2Params) -> Self {
        Self {
            version: CURRENT_VERSION,
            kdf: KdfHeader::argon2id(params),
            salt: salt.to_vec(),
            nonce: sealed.nonce,
            auth_tag: sealed.tag,
            ciphertext: sealed.ciphertext,
        }
    }

    /// The parts `crypto::open` needs.
    pub fn sealed(&self) -> Sealed {
        Sealed {
            nonce: self.nonce.clone(),
            ciphertext: self.ciphertext.clone(),
            tag: self.auth_tag.clone(),
        }
    }

    /// Serialize to the on-disk JSON representation.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| PassVaultError::SerializationError(format!("envelope: {e}")))
    }

    /// Parse and validate the on-disk JSON representation.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let envelope: Envelope = serde_json::from_slice(data)
            .map_err(|e| PassVaultError::InvalidVaultFormat(format!("envelope JSON: {e}")))?;

        if envelope.version != CURRENT_VERSION {
            return Err(PassVaultError::InvalidVaultFormat(format!(
                "unsupported version {}, expected {CURRENT_VERSION}",
                envelope.version
            )));
        }
        if envelope.kdf.algorithm != KDF_ALGORITHM {
            return Err(PassVaultError::InvalidVaultFormat(format!(
                "unsupported key derivation '{}'",
                envelope.kdf.algorithm
            )));
        }
        if envelope.salt.is_empty() {
            return Err(PassVaultError::InvalidVaultFormat("missing salt".into()));
        }

        Ok(envelope)
    }
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

pub(crate) fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let encoded = BASE64.encode(data);
    serializer.serialize_str(&encoded)
}

pub(crate) fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Envelope {
        Envelope::new(
            Sealed {
                nonce: vec![1; 12],
                ciphertext: vec![2; 40],
                tag: vec![3; 16],
            },
            &[4; 32],
            Argon2Params::minimum(),
        )
    }

    #[test]
    fn json_uses_legacy_field_names() {
        let json: serde_json::Value = serde_json::from_slice(&sample().to_json().unwrap()).unwrap();
        assert_eq!(json["version"], 1);
        assert_eq!(json["kdf"]["algorithm"], "argon2id");
        assert_eq!(json["kdf"]["memory_kib"], 8_192);
        for field in ["salt", "iv", "authTag", "encryptedData"] {
            assert!(json[field].is_string(), "{field} should be a base64 string");
        }
    }

    #[test]
    fn parse_back() {
        let env = sample();
        let parsed = Envelope::from_json(&env.to_json().unwrap()).unwrap();
        assert_eq!(parsed, env);
        assert_eq!(parsed.sealed().tag, vec![3; 16]);
    }

    #[test]
    fn rejects_unknown_version() {
        let mut env = sample();
        env.version = 2;
        let data = serde_json::to_vec(&env).unwrap();
        assert!(matches!(
            Envelope::from_json(&data),
            Err(PassVaultError::InvalidVaultFormat(_))
        ));
    }

    #[test]
    fn rejects_legacy_envelope_without_version() {
        let legacy = br#"{"encryptedData":"AA==","salt":"AA==","iv":"AA==","authTag":"AA=="}"#;
        assert!(Envelope::from_json(legacy).is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!(Envelope::from_json(b"not json").is_err());
        assert!(Envelope::from_json(br#"{"version":1,"salt":"!!!"}"#).is_err());
    }
}
