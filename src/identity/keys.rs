//! Key pair management

use super::{IdentityError, PrivateKey, PublicKey};
use crate::crypto::{CurveContext, PRIV_KEY_SIZE, PUB_KEY_SIZE};
use zeroize::Zeroizing;

/// Schnorr key pair for signing operations
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPair {
    pub private_key: PrivateKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generate a fresh key pair
    pub fn generate(ctx: &CurveContext) -> Result<Self, IdentityError> {
        Self::from_private(ctx, PrivateKey::generate(ctx)?)
    }

    /// Pair a private key with its derived public key. Fails for an invalid scalar.
    pub fn from_private(ctx: &CurveContext, private_key: PrivateKey) -> Result<Self, IdentityError> {
        let public_key = PublicKey::try_from_private(ctx, &private_key)?;
        tracing::debug!("Created key pair for {}", public_key);
        Ok(Self {
            private_key,
            public_key,
        })
    }

    /// Get the public key bytes
    pub fn public_key_bytes(&self) -> [u8; PUB_KEY_SIZE] {
        self.public_key.to_bytes()
    }

    /// Get the private key bytes
    pub fn private_key_bytes(&self) -> Zeroizing<[u8; PRIV_KEY_SIZE]> {
        self.private_key.to_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypair_creation() {
        let ctx = CurveContext::global();
        let mut seed = [0u8; PRIV_KEY_SIZE];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut seed);
        // Keep the seed well below the group order
        seed[0] = 0x01;

        let private_key = PrivateKey::from_slice(ctx, &seed, 0).unwrap();
        let keypair = KeyPair::from_private(ctx, private_key).unwrap();

        assert_eq!(*keypair.private_key_bytes(), seed);
        assert_ne!(&keypair.public_key_bytes()[1..], &seed[..]);
        assert_eq!(
            keypair.public_key,
            PublicKey::from_private(ctx, &keypair.private_key)
        );
    }

    #[test]
    fn test_generate() {
        let ctx = CurveContext::global();
        let a = KeyPair::generate(ctx).unwrap();
        let b = KeyPair::generate(ctx).unwrap();

        assert!(a.private_key.is_valid(ctx));
        assert!(!a.public_key.is_identity());
        assert_ne!(a, b);
    }

    #[test]
    fn test_invalid_private_key_rejected() {
        let ctx = CurveContext::global();
        let zero = PrivateKey::from_slice(ctx, &[0u8; PRIV_KEY_SIZE], 0).unwrap();

        assert_eq!(
            KeyPair::from_private(ctx, zero),
            Err(IdentityError::InvalidPrivateKey)
        );
    }
}
