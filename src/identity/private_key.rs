//! Secret scalar keys
//!
//! The scalar is held in a [`SecureBuffer`] so it is wiped on drop, on
//! replacement by a successful deserialize, and on every error path.

use super::{read_field, write_field, IdentityError};
use crate::crypto::{curve, CurveContext, SecureBuffer, PRIV_KEY_SIZE};
use crypto_bigint::U256;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use std::fmt;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// Schnorr private key
#[derive(Clone)]
pub struct PrivateKey {
    scalar: SecureBuffer<U256>,
}

impl PrivateKey {
    /// Generate a fresh key from the operating system RNG
    pub fn generate(ctx: &CurveContext) -> Result<Self, IdentityError> {
        Self::generate_with_rng(ctx, &mut OsRng)
    }

    /// Generate a key in `[1, order)` from the given RNG.
    /// An RNG failure aborts generation.
    pub fn generate_with_rng<R: RngCore + CryptoRng + ?Sized>(
        ctx: &CurveContext,
        rng: &mut R,
    ) -> Result<Self, IdentityError> {
        let mut attempts: u32 = 0;
        loop {
            attempts += 1;
            let candidate = SecureBuffer::new(ctx.sample_scalar(rng)?);
            if *candidate.expose() != U256::ZERO {
                tracing::trace!(attempts, "Generated private key");
                return Ok(Self { scalar: candidate });
            }
            tracing::trace!(attempts, "Sampled zero scalar, retrying");
        }
    }

    /// Read a key from `src` at `offset`
    pub fn from_slice(ctx: &CurveContext, src: &[u8], offset: usize) -> Result<Self, IdentityError> {
        Ok(Self {
            scalar: SecureBuffer::new(Self::read_scalar(ctx, src, offset)?),
        })
    }

    /// Overwrite this key with `PRIV_KEY_SIZE` big-endian bytes from `src` at `offset`.
    ///
    /// The range `[1, order)` is only enforced when the context's
    /// `strict_private_keys` policy is on. On failure the key keeps its
    /// previous value.
    pub fn deserialize_from(
        &mut self,
        ctx: &CurveContext,
        src: &[u8],
        offset: usize,
    ) -> Result<(), IdentityError> {
        let scalar = Self::read_scalar(ctx, src, offset)?;
        self.scalar.replace(scalar);
        Ok(())
    }

    fn read_scalar(ctx: &CurveContext, src: &[u8], offset: usize) -> Result<U256, IdentityError> {
        let field = read_field(src, offset, PRIV_KEY_SIZE)?;
        let scalar = SecureBuffer::new(curve::decode_scalar(field)?);

        if ctx.config().strict_private_keys && !ctx.is_valid_scalar(scalar.expose()) {
            tracing::debug!("Rejected out-of-range private key");
            return Err(IdentityError::InvalidPrivateKey);
        }
        Ok(*scalar.expose())
    }

    /// Write the scalar as `PRIV_KEY_SIZE` big-endian bytes at `offset`, zero-padded.
    ///
    /// # Panics
    ///
    /// Panics if `offset + PRIV_KEY_SIZE` overflows `usize`.
    pub fn serialize_to(&self, dst: &mut Vec<u8>, offset: usize) {
        let bytes = curve::encode_scalar(self.scalar.expose());
        write_field(dst, offset, &bytes[..]);
    }

    /// Get the fixed-width scalar bytes
    pub fn to_bytes(&self) -> Zeroizing<[u8; PRIV_KEY_SIZE]> {
        curve::encode_scalar(self.scalar.expose())
    }

    /// Whether the scalar lies in `[1, order)` for this context
    pub fn is_valid(&self, ctx: &CurveContext) -> bool {
        ctx.is_valid_scalar(self.scalar.expose())
    }

    pub(crate) fn scalar(&self) -> &U256 {
        self.scalar.expose()
    }

    #[cfg(test)]
    pub(crate) fn from_scalar(scalar: U256) -> Self {
        Self {
            scalar: SecureBuffer::new(scalar),
        }
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        bool::from(self.scalar.expose().ct_eq(other.scalar.expose()))
    }
}

impl Eq for PrivateKey {}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::SECP256K1_ORDER;
    use crate::KeysConfig;
    use crypto_bigint::Encoding;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    /// RNG whose entropy source is always unavailable
    struct BrokenRng;

    impl RngCore for BrokenRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new("entropy source unavailable"))
        }
    }

    impl CryptoRng for BrokenRng {}

    /// Yields all-zero output a few times before falling back to real randomness
    struct ZeroThenRandom {
        zeros_left: usize,
        inner: ChaCha20Rng,
    }

    impl RngCore for ZeroThenRandom {
        fn next_u32(&mut self) -> u32 {
            self.inner.next_u32()
        }

        fn next_u64(&mut self) -> u64 {
            self.inner.next_u64()
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            if self.zeros_left > 0 {
                self.zeros_left -= 1;
                dest.fill(0);
            } else {
                self.inner.fill_bytes(dest);
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    impl CryptoRng for ZeroThenRandom {}

    #[test]
    fn test_generated_keys_are_in_range() {
        let ctx = CurveContext::global();

        for _ in 0..256 {
            let key = PrivateKey::generate(ctx).unwrap();
            assert!(key.is_valid(ctx));
            assert!(*key.scalar() != U256::ZERO);
            assert!(*key.scalar() < SECP256K1_ORDER);
        }
    }

    #[test]
    fn test_generation_never_yields_zero_with_tiny_order() {
        // With order 2 the only valid scalar is 1 and half the samples are zero
        let ctx = CurveContext::default().with_order(U256::from_u64(2)).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(3);

        for _ in 0..100 {
            let key = PrivateKey::generate_with_rng(&ctx, &mut rng).unwrap();
            assert_eq!(*key.scalar(), U256::ONE);
        }
    }

    #[test]
    fn test_generation_retries_on_zero() {
        let ctx = CurveContext::global();
        let mut rng = ZeroThenRandom {
            zeros_left: 3,
            inner: ChaCha20Rng::seed_from_u64(11),
        };

        let key = PrivateKey::generate_with_rng(ctx, &mut rng).unwrap();
        assert!(key.is_valid(ctx));
    }

    #[test]
    fn test_generation_is_deterministic_for_seeded_rng() {
        let ctx = CurveContext::global();

        let a = PrivateKey::generate_with_rng(ctx, &mut ChaCha20Rng::seed_from_u64(5)).unwrap();
        let b = PrivateKey::generate_with_rng(ctx, &mut ChaCha20Rng::seed_from_u64(5)).unwrap();
        let c = PrivateKey::generate_with_rng(ctx, &mut ChaCha20Rng::seed_from_u64(6)).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_rng_failure_aborts_generation() {
        let result = PrivateKey::generate_with_rng(CurveContext::global(), &mut BrokenRng);

        assert!(matches!(
            result,
            Err(IdentityError::Crypto(crate::crypto::CryptoError::Rng(_)))
        ));
    }

    #[test]
    fn test_serialize_roundtrip() {
        let ctx = CurveContext::global();
        let key = PrivateKey::generate(ctx).unwrap();

        let mut buf = Vec::new();
        key.serialize_to(&mut buf, 0);
        assert_eq!(buf.len(), PRIV_KEY_SIZE);

        let restored = PrivateKey::from_slice(ctx, &buf, 0).unwrap();
        assert_eq!(key, restored);
    }

    #[test]
    fn test_serialize_at_offset() {
        let ctx = CurveContext::global();
        let key = PrivateKey::generate(ctx).unwrap();

        let mut buf = vec![0xEEu8; 5];
        key.serialize_to(&mut buf, 5);

        assert_eq!(buf.len(), 5 + PRIV_KEY_SIZE);
        assert_eq!(&buf[..5], &[0xEE; 5]);
        assert_eq!(&buf[5..], &key.to_bytes()[..]);
        assert_eq!(PrivateKey::from_slice(ctx, &buf, 5).unwrap(), key);
    }

    #[test]
    #[should_panic(expected = "field end overflows usize")]
    fn test_serialize_at_unaddressable_offset_panics() {
        let key = PrivateKey::from_scalar(U256::ONE);
        let mut buf = Vec::new();
        key.serialize_to(&mut buf, usize::MAX - 4);
    }

    #[test]
    fn test_small_scalar_is_left_padded() {
        let key = PrivateKey::from_scalar(U256::from_u64(5));

        let mut buf = Vec::new();
        key.serialize_to(&mut buf, 0);

        assert_eq!(buf.len(), PRIV_KEY_SIZE);
        assert!(buf[..PRIV_KEY_SIZE - 1].iter().all(|b| *b == 0));
        assert_eq!(buf[PRIV_KEY_SIZE - 1], 5);
    }

    #[test]
    fn test_short_buffer_leaves_key_unchanged() {
        let ctx = CurveContext::global();
        let mut key = PrivateKey::generate(ctx).unwrap();
        let before = key.clone();

        let short = vec![0x11u8; PRIV_KEY_SIZE - 1];
        assert_eq!(
            key.deserialize_from(ctx, &short, 0),
            Err(IdentityError::BufferTooShort {
                need: PRIV_KEY_SIZE,
                have: PRIV_KEY_SIZE - 1
            })
        );
        assert_eq!(key, before);

        // Long enough overall, but not from this offset
        let buf = vec![0x11u8; PRIV_KEY_SIZE];
        assert!(key.deserialize_from(ctx, &buf, 1).is_err());
        assert_eq!(key, before);
    }

    #[test]
    fn test_lenient_decoding_accepts_out_of_range_scalars() {
        let ctx = CurveContext::global();

        // Zero and values >= order are accepted on the wire by default
        let zero = PrivateKey::from_slice(ctx, &[0u8; PRIV_KEY_SIZE], 0).unwrap();
        assert!(!zero.is_valid(ctx));

        let max = PrivateKey::from_slice(ctx, &[0xFFu8; PRIV_KEY_SIZE], 0).unwrap();
        assert!(!max.is_valid(ctx));
    }

    #[test]
    fn test_strict_decoding_rejects_out_of_range_scalars() {
        let ctx = CurveContext::new(KeysConfig {
            strict_private_keys: true,
            ..KeysConfig::default()
        });
        let mut key = PrivateKey::generate(&ctx).unwrap();
        let before = key.clone();

        assert_eq!(
            key.deserialize_from(&ctx, &[0u8; PRIV_KEY_SIZE], 0),
            Err(IdentityError::InvalidPrivateKey)
        );
        assert_eq!(
            key.deserialize_from(&ctx, &SECP256K1_ORDER.to_be_bytes(), 0),
            Err(IdentityError::InvalidPrivateKey)
        );
        assert_eq!(key, before);

        let mut one = [0u8; PRIV_KEY_SIZE];
        one[PRIV_KEY_SIZE - 1] = 1;
        key.deserialize_from(&ctx, &one, 0).unwrap();
        assert_eq!(*key.scalar(), U256::ONE);
    }

    #[test]
    fn test_clone_and_equality() {
        let ctx = CurveContext::global();
        let a = PrivateKey::generate(ctx).unwrap();
        let b = a.clone();
        let c = PrivateKey::generate(ctx).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_debug_does_not_leak() {
        let key = PrivateKey::from_scalar(U256::from_u64(0xABCDEF));
        let printed = format!("{:?}", key);

        assert_eq!(printed, "PrivateKey(<redacted>)");
    }
}
