//! Owned secret storage with explicit, idempotent erasure.
//!
//! Every type holding key material implements [`Dispose`]. Erasure goes
//! through `zeroize`, whose volatile writes the optimizer cannot drop, and
//! `Drop` disposes too, so early returns and panics still wipe the bytes.

use crate::error::{HdError, Result};
use std::fmt;
use tracing::trace;
use zeroize::{Zeroize, Zeroizing};

/// Explicit teardown for anything that owns secret bytes.
pub trait Dispose {
    /// Zero every owned secret and invalidate the owner. Calling it again is
    /// a no-op.
    fn dispose(&mut self);

    fn is_disposed(&self) -> bool;
}

/// A fixed-size secret kept on the heap so moving the owner never leaves a
/// stray copy of the bytes behind on the stack.
pub struct SecretBuffer<const N: usize> {
    bytes: Box<[u8; N]>,
    disposed: bool,
}

impl<const N: usize> SecretBuffer<N> {
    /// Copy a secret from a slice, rejecting any length other than `N`.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != N {
            return Err(HdError::InvalidKeyLength {
                expected: N,
                actual: bytes.len(),
            });
        }
        let mut buf = Self::zeroed();
        buf.bytes.copy_from_slice(bytes);
        Ok(buf)
    }

    fn zeroed() -> Self {
        SecretBuffer {
            bytes: Box::new([0u8; N]),
            disposed: false,
        }
    }

    /// Read-only view of the secret while it is live.
    pub fn expose(&self) -> Result<&[u8; N]> {
        if self.disposed {
            return Err(HdError::DisposedKey);
        }
        Ok(&*self.bytes)
    }

    pub(crate) fn expose_mut(&mut self) -> Result<&mut [u8; N]> {
        if self.disposed {
            return Err(HdError::DisposedKey);
        }
        Ok(&mut *self.bytes)
    }

    /// Independent copy that wipes itself when dropped. Erasing it is the
    /// receiver's business; disposing `self` does not touch the copy.
    pub fn copy_out(&self) -> Result<Zeroizing<[u8; N]>> {
        Ok(Zeroizing::new(*self.expose()?))
    }

    /// Fresh buffer holding the same bytes.
    pub(crate) fn duplicate(&self) -> Result<Self> {
        Self::from_slice(self.expose()?)
    }
}

impl<const N: usize> Dispose for SecretBuffer<N> {
    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.bytes.zeroize();
        self.disposed = true;
        trace!(len = N, "secret buffer disposed");
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl<const N: usize> Drop for SecretBuffer<N> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<const N: usize> fmt::Debug for SecretBuffer<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretBuffer")
            .field("len", &N)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}
