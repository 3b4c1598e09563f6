//! Schnorr Keys - private and public key material over secp256k1
//!
//! This crate provides the key types for a Schnorr-signature identity system:
//! constrained random generation of private scalars, derivation of public
//! points, canonical fixed-width serialization, and guaranteed zeroing of
//! secret memory. Signing and verification live elsewhere.

pub mod crypto;
pub mod identity;

pub use crypto::{CurveContext, PRIV_KEY_SIZE, PUB_KEY_SIZE};
pub use identity::{KeyPair, PrivateKey, PublicKey};

use std::path::Path;
use thiserror::Error;

/// Main error type for key operations
#[derive(Error, Debug)]
pub enum SchnorrError {
    #[error("Cryptographic error: {0}")]
    Crypto(#[from] crypto::CryptoError),

    #[error("Identity error: {0}")]
    Identity(#[from] identity::IdentityError),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SchnorrError>;

/// Validation policy applied by a [`CurveContext`]
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct KeysConfig {
    /// Reject private keys outside `[1, order)` when deserializing
    pub strict_private_keys: bool,

    /// Reject the identity point when deserializing public keys
    pub reject_identity_public_keys: bool,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            strict_private_keys: false,
            reject_identity_public_keys: false,
        }
    }
}

impl KeysConfig {
    /// Parse a JSON policy; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON policy from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        tracing::debug!("Loaded key policy from {}", path.as_ref().display());
        Self::from_json(&raw)
    }
}
