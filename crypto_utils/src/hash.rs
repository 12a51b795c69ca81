use sha2::{Digest, Sha256};

/// SHA-256 of `input`, used to turn arbitrary messages into 32-byte signing digests.
pub fn sha256(input: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(input);
    let result = hasher.finalize();
    result.into()
}
