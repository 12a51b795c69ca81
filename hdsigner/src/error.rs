use thiserror::Error;

/// Every failure the derivation engine and signing facade can report.
///
/// Messages name the violated precondition only; they never carry key bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HdError {
    #[error("invalid derivation path format: {0:?}")]
    InvalidPathFormat(String),
    #[error("invalid child index in path segment {0:?}")]
    InvalidIndex(String),
    #[error("master key derived from seed is outside [1, n-1]")]
    InvalidMasterKey,
    #[error("invalid private key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },
    #[error("private key is not a valid secp256k1 scalar")]
    InvalidScalar,
    #[error("invalid digest length: expected 32 bytes, got {0}")]
    InvalidDigestLength(usize),
    #[error("invalid signature length: expected 64 or 65 bytes, got {0}")]
    InvalidSignatureLength(usize),
    #[error("key has been disposed")]
    DisposedKey,
    #[error("invalid seed: {0}")]
    InvalidSeed(String),
    #[error("no valid child left after index {0:#010x}")]
    IndexExhausted(u32),
}

pub type Result<T> = std::result::Result<T, HdError>;
