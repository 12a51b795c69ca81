use crate::error::{HdError, Result};
use crate::secret::Dispose;
use bip39::Mnemonic;
use std::fmt;
use tracing::debug;
use zeroize::{Zeroize, Zeroizing};

/// Root entropy for a key tree.
///
/// Every accepted input form (raw bytes, hex, BIP-39 phrase) is normalized
/// into this one byte sequence before the engine sees it.
pub struct Seed {
    bytes: Zeroizing<Vec<u8>>,
    disposed: bool,
}

impl Seed {
    /// Take ownership of raw seed bytes. Any length is accepted.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Seed {
            bytes: Zeroizing::new(bytes),
            disposed: false,
        }
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s.trim()).map_err(|e| HdError::InvalidSeed(e.to_string()))?;
        Ok(Self::from_bytes(bytes))
    }

    /// BIP-39 seed (PBKDF2-HMAC-SHA512, 2048 rounds) from an English phrase.
    /// A phrase with unknown words or a bad checksum is rejected before any
    /// key material is produced.
    pub fn from_mnemonic(phrase: &str, passphrase: &str) -> Result<Self> {
        let mnemonic =
            Mnemonic::parse(phrase).map_err(|e| HdError::InvalidSeed(e.to_string()))?;
        let mut seed = mnemonic.to_seed(passphrase);
        let out = Self::from_bytes(seed.to_vec());
        seed.zeroize();
        debug!(words = mnemonic.word_count(), "seed derived from mnemonic");
        Ok(out)
    }

    pub fn as_bytes(&self) -> Result<&[u8]> {
        if self.disposed {
            return Err(HdError::DisposedKey);
        }
        Ok(&self.bytes)
    }

    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }
}

impl From<&[u8]> for Seed {
    fn from(bytes: &[u8]) -> Self {
        Seed::from_bytes(bytes.to_vec())
    }
}

impl Dispose for Seed {
    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.bytes.zeroize();
        self.disposed = true;
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seed")
            .field("len", &self.bytes.len())
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}
