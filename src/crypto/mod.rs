//! Cryptography Module - curve primitives for Schnorr key material
//!
//! Wraps the secp256k1 arithmetic from `k256` and the fixed-width integers
//! from `crypto-bigint` behind a narrow interface, and provides zeroizing
//! storage for secrets.

pub mod curve;
mod secure;

pub use curve::{CurveContext, PRIV_KEY_SIZE, PUB_KEY_SIZE, SECP256K1_ORDER};
pub use secure::SecureBuffer;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Random source failed: {0}")]
    Rng(String),

    #[error("Scalar is not a canonical field element")]
    InvalidScalar,

    #[error("Bytes do not encode a point on the curve")]
    InvalidPoint,

    #[error("Invalid curve parameters: {0}")]
    InvalidParameters(String),
}
