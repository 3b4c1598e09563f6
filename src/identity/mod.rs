//! Identity Module - Schnorr private and public keys
//!
//! A [`PrivateKey`] is a secret scalar in `[1, order)`; its [`PublicKey`] is
//! the point `scalar · G`. Both serialize to fixed-width fields inside a
//! caller-owned byte buffer at a given offset.

mod keys;
mod private_key;
mod public_key;

pub use keys::KeyPair;
pub use private_key::PrivateKey;
pub use public_key::PublicKey;

use crate::crypto::CryptoError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Buffer too short: need {need} bytes, have {have}")]
    BufferTooShort { need: usize, have: usize },

    #[error("Private key scalar is zero or not below the group order")]
    InvalidPrivateKey,

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    #[error("Cryptographic error: {0}")]
    Crypto(#[from] CryptoError),
}

/// Borrow `size` bytes of `src` starting at `offset`
fn read_field(src: &[u8], offset: usize, size: usize) -> Result<&[u8], IdentityError> {
    let need = offset.saturating_add(size);
    if need > src.len() {
        return Err(IdentityError::BufferTooShort {
            need,
            have: src.len(),
        });
    }
    Ok(&src[offset..need])
}

/// Write `field` into `dst` at `offset`, growing `dst` with zeros if needed.
///
/// # Panics
///
/// Panics if `offset + field.len()` overflows `usize`. Such a buffer could
/// never be allocated, so this is treated like allocation failure.
fn write_field(dst: &mut Vec<u8>, offset: usize, field: &[u8]) {
    let end = offset
        .checked_add(field.len())
        .unwrap_or_else(|| panic!("field end overflows usize (offset {})", offset));
    if dst.len() < end {
        dst.resize(end, 0);
    }
    dst[offset..end].copy_from_slice(field);
}
