//! secp256k1 curve context
//!
//! The group order, generator and key policy are bundled into an immutable
//! [`CurveContext`] that every key operation borrows. A lazily built default
//! context is available through [`CurveContext::global`].

use super::CryptoError;
use crate::KeysConfig;
use crypto_bigint::{Encoding, U256};
use k256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use k256::elliptic_curve::{Group, PrimeField};
use k256::{AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint, Scalar};
use once_cell::sync::Lazy;
use rand::{CryptoRng, RngCore};
use zeroize::{Zeroize, Zeroizing};

/// Serialized private key size (big-endian scalar)
pub const PRIV_KEY_SIZE: usize = 32;

/// Serialized public key size (SEC1 compressed point)
pub const PUB_KEY_SIZE: usize = 33;

/// Order of the secp256k1 base point
pub const SECP256K1_ORDER: U256 =
    U256::from_be_hex("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141");

static GLOBAL_CONTEXT: Lazy<CurveContext> = Lazy::new(CurveContext::default);

/// Read-only description of the group keys live in
#[derive(Debug, Clone)]
pub struct CurveContext {
    name: &'static str,
    order: U256,
    generator: ProjectivePoint,
    config: KeysConfig,
}

impl CurveContext {
    /// secp256k1 with the standard generator and the given key policy
    pub fn new(config: KeysConfig) -> Self {
        Self {
            name: "secp256k1",
            order: SECP256K1_ORDER,
            generator: ProjectivePoint::GENERATOR,
            config,
        }
    }

    /// Shared process-wide context with the default policy
    pub fn global() -> &'static CurveContext {
        &GLOBAL_CONTEXT
    }

    /// Replace the scalar bound. Must be in `[2, n]` for the secp256k1 order `n`
    /// so that `[1, order)` holds at least one key.
    pub fn with_order(mut self, order: U256) -> Result<Self, CryptoError> {
        if order < U256::from_u64(2) {
            return Err(CryptoError::InvalidParameters(
                "order must be at least 2".into(),
            ));
        }
        if order > SECP256K1_ORDER {
            return Err(CryptoError::InvalidParameters(
                "order exceeds the secp256k1 group order".into(),
            ));
        }
        self.order = order;
        Ok(self)
    }

    /// Replace the generator used for public key derivation
    pub fn with_generator(mut self, generator: ProjectivePoint) -> Result<Self, CryptoError> {
        if bool::from(generator.is_identity()) {
            return Err(CryptoError::InvalidParameters(
                "generator must not be the identity".into(),
            ));
        }
        self.generator = generator;
        Ok(self)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn order(&self) -> &U256 {
        &self.order
    }

    pub fn generator(&self) -> &ProjectivePoint {
        &self.generator
    }

    pub fn config(&self) -> &KeysConfig {
        &self.config
    }

    /// The point at infinity
    pub fn identity(&self) -> ProjectivePoint {
        ProjectivePoint::IDENTITY
    }

    /// Uniform sample from `[0, order)` by masked rejection sampling
    pub fn sample_scalar<R: RngCore + CryptoRng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<U256, CryptoError> {
        let order_bytes = self.order.to_be_bytes();
        let top = order_bytes
            .iter()
            .position(|b| *b != 0)
            .unwrap_or(PRIV_KEY_SIZE - 1);
        let mask = u8::MAX >> order_bytes[top].leading_zeros();

        let mut buf = Zeroizing::new([0u8; PRIV_KEY_SIZE]);
        loop {
            rng.try_fill_bytes(&mut buf[..])
                .map_err(|e| CryptoError::Rng(e.to_string()))?;
            buf[..top].fill(0);
            buf[top] &= mask;

            let mut candidate = U256::from_be_bytes(*buf);
            if candidate < self.order {
                return Ok(candidate);
            }
            candidate.zeroize();
        }
    }

    /// Whether `scalar` lies in `[1, order)`
    pub fn is_valid_scalar(&self, scalar: &U256) -> bool {
        *scalar != U256::ZERO && *scalar < self.order
    }

    /// Compute `scalar · G`
    pub fn mul_generator(&self, scalar: &U256) -> Result<ProjectivePoint, CryptoError> {
        let repr = Zeroizing::new(scalar.to_be_bytes());
        let field_scalar: Option<Scalar> =
            Scalar::from_repr(*FieldBytes::from_slice(&repr[..])).into();
        let field_scalar = Zeroizing::new(field_scalar.ok_or(CryptoError::InvalidScalar)?);

        Ok(self.generator * *field_scalar)
    }
}

impl Default for CurveContext {
    fn default() -> Self {
        Self::new(KeysConfig::default())
    }
}

/// Fixed-width big-endian encoding of a scalar
pub fn encode_scalar(scalar: &U256) -> Zeroizing<[u8; PRIV_KEY_SIZE]> {
    Zeroizing::new(scalar.to_be_bytes())
}

/// Decode a fixed-width big-endian scalar. No range check is applied.
pub fn decode_scalar(bytes: &[u8]) -> Result<U256, CryptoError> {
    if bytes.len() != PRIV_KEY_SIZE {
        return Err(CryptoError::InvalidScalar);
    }
    Ok(U256::from_be_slice(bytes))
}

/// SEC1 compressed encoding. The identity encodes as all zeros.
pub fn encode_point(point: &ProjectivePoint) -> [u8; PUB_KEY_SIZE] {
    let mut out = [0u8; PUB_KEY_SIZE];
    if bool::from(point.is_identity()) {
        return out;
    }

    let encoded = point.to_affine().to_encoded_point(true);
    let bytes = encoded.as_bytes();
    out[PUB_KEY_SIZE - bytes.len()..].copy_from_slice(bytes);
    out
}

/// Decode a SEC1 compressed point, checking that it lies on the curve
pub fn decode_point(bytes: &[u8]) -> Result<ProjectivePoint, CryptoError> {
    if bytes.len() != PUB_KEY_SIZE {
        return Err(CryptoError::InvalidPoint);
    }
    if bytes.iter().all(|b| *b == 0) {
        return Ok(ProjectivePoint::IDENTITY);
    }

    let encoded = EncodedPoint::from_bytes(bytes).map_err(|_| CryptoError::InvalidPoint)?;
    if !encoded.is_compressed() {
        return Err(CryptoError::InvalidPoint);
    }

    let affine: Option<AffinePoint> = AffinePoint::from_encoded_point(&encoded).into();
    affine.map(ProjectivePoint::from).ok_or(CryptoError::InvalidPoint)
}
