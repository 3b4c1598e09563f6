//! Curve point public keys
//!
//! Equality, ordering, hashing and the `0x…` string form all work on the
//! 33-byte compressed encoding, so a `PublicKey` can key a map or a set.

use super::{read_field, write_field, IdentityError, PrivateKey};
use crate::crypto::{curve, CurveContext, SecureBuffer, PUB_KEY_SIZE};
use k256::elliptic_curve::Group;
use k256::ProjectivePoint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Schnorr public key
#[derive(Clone)]
pub struct PublicKey {
    point: SecureBuffer<ProjectivePoint>,
}

impl PublicKey {
    /// Public key holding the identity point. Not usable for verification.
    pub fn new() -> Self {
        Self {
            point: SecureBuffer::new(ProjectivePoint::IDENTITY),
        }
    }

    /// Derive `scalar · G`.
    ///
    /// An invalid private key (zero or not below the order) yields the
    /// identity point instead of an error. Use [`PublicKey::try_from_private`]
    /// when the caller needs to know.
    pub fn from_private(ctx: &CurveContext, private_key: &PrivateKey) -> Self {
        match Self::try_from_private(ctx, private_key) {
            Ok(public_key) => public_key,
            Err(e) => {
                tracing::warn!("Public key derivation failed, falling back to identity: {}", e);
                Self::new()
            }
        }
    }

    /// Derive `scalar · G`, reporting invalid input
    pub fn try_from_private(
        ctx: &CurveContext,
        private_key: &PrivateKey,
    ) -> Result<Self, IdentityError> {
        if !private_key.is_valid(ctx) {
            return Err(IdentityError::InvalidPrivateKey);
        }

        let point = ctx.mul_generator(private_key.scalar())?;
        Ok(Self {
            point: SecureBuffer::new(point),
        })
    }

    /// Read a key from `src` at `offset`
    pub fn from_slice(ctx: &CurveContext, src: &[u8], offset: usize) -> Result<Self, IdentityError> {
        let mut public_key = Self::new();
        public_key.deserialize_from(ctx, src, offset)?;
        Ok(public_key)
    }

    /// Overwrite this key with a `PUB_KEY_SIZE` compressed point from `src` at `offset`.
    /// On failure the key keeps its previous value.
    pub fn deserialize_from(
        &mut self,
        ctx: &CurveContext,
        src: &[u8],
        offset: usize,
    ) -> Result<(), IdentityError> {
        let field = read_field(src, offset, PUB_KEY_SIZE)?;
        let point = curve::decode_point(field)?;
        check_policy(ctx, &point)?;

        self.point.replace(point);
        Ok(())
    }

    /// Parse `0x`-prefixed or bare hex, applying the context's policy.
    ///
    /// Unlike [`FromStr`], this rejects the identity point when
    /// `reject_identity_public_keys` is set.
    pub fn parse_with(ctx: &CurveContext, s: &str) -> Result<Self, IdentityError> {
        let public_key: Self = s.parse()?;
        check_policy(ctx, public_key.point.expose())?;
        Ok(public_key)
    }

    /// Write the compressed point as `PUB_KEY_SIZE` bytes at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset + PUB_KEY_SIZE` overflows `usize`.
    pub fn serialize_to(&self, dst: &mut Vec<u8>, offset: usize) {
        write_field(dst, offset, &self.to_bytes());
    }

    /// Get the compressed encoding
    pub fn to_bytes(&self) -> [u8; PUB_KEY_SIZE] {
        curve::encode_point(self.point.expose())
    }

    /// Whether this key holds the point at infinity
    pub fn is_identity(&self) -> bool {
        bool::from(self.point.expose().is_identity())
    }

    /// Get the underlying curve point
    pub fn as_point(&self) -> &ProjectivePoint {
        self.point.expose()
    }

    /// Lowercase hex of the compressed encoding, without prefix
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Convert to base58 string (shorter, for sharing)
    pub fn to_base58(&self) -> String {
        bs58::encode(self.to_bytes()).into_string()
    }

    /// Parse from base58 string. Accepts the identity regardless of policy.
    pub fn from_base58(s: &str) -> Result<Self, IdentityError> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| IdentityError::InvalidPublicKey(e.to_string()))?;
        Self::from_encoded(&bytes)
    }

    fn from_encoded(bytes: &[u8]) -> Result<Self, IdentityError> {
        if bytes.len() != PUB_KEY_SIZE {
            return Err(IdentityError::InvalidPublicKey(format!(
                "expected {} bytes, got {}",
                PUB_KEY_SIZE,
                bytes.len()
            )));
        }
        Ok(Self {
            point: SecureBuffer::new(curve::decode_point(bytes)?),
        })
    }
}

fn check_policy(ctx: &CurveContext, point: &ProjectivePoint) -> Result<(), IdentityError> {
    if ctx.config().reject_identity_public_keys && bool::from(point.is_identity()) {
        return Err(IdentityError::InvalidPublicKey("identity point".into()));
    }
    Ok(())
}

impl Default for PublicKey {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for PublicKey {}

impl Ord for PublicKey {
    // Fixed-width big-endian bytes compare like the unsigned integers they encode
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_bytes().cmp(&other.to_bytes())
    }
}

impl PartialOrd for PublicKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for PublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self)
    }
}

impl FromStr for PublicKey {
    type Err = IdentityError;

    /// Parse `0x`-prefixed or bare hex of the compressed encoding.
    /// No context is available here, so the identity is always accepted;
    /// use [`PublicKey::parse_with`] to apply a policy.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| IdentityError::InvalidHex(e.to_string()))?;
        Self::from_encoded(&bytes)
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Deserializes through [`FromStr`], so the identity is accepted regardless of policy
impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
