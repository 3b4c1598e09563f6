//! Guaranteed-wipe storage for key material
//!
//! Values held in a [`SecureBuffer`] are overwritten with zeros when the buffer
//! is dropped or replaced, on every exit path including unwinding.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Owned value that is zeroized on drop
pub struct SecureBuffer<T: Zeroize> {
    value: T,
}

impl<T: Zeroize> SecureBuffer<T> {
    /// Take ownership of a value
    pub fn new(value: T) -> Self {
        Self { value }
    }

    /// Borrow the protected value
    pub fn expose(&self) -> &T {
        &self.value
    }

    /// Swap in a new value, wiping the old one first
    pub fn replace(&mut self, value: T) {
        self.value.zeroize();
        self.value = value;
    }

    /// Wipe the value in place without dropping the buffer
    pub fn wipe(&mut self) {
        self.value.zeroize();
    }
}

impl<T: Zeroize + Clone> Clone for SecureBuffer<T> {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl<T: Zeroize> Drop for SecureBuffer<T> {
    fn drop(&mut self) {
        self.value.zeroize();
    }
}

impl<T: Zeroize> ZeroizeOnDrop for SecureBuffer<T> {}

impl<T: Zeroize> fmt::Debug for SecureBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecureBuffer(<redacted>)")
    }
}
