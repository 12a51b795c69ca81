use crate::curve::public_key_from_scalar;
use crate::error::{HdError, Result};
use crate::extended_key::ExtendedKey;
use crate::secret::{Dispose, SecretBuffer};
use crypto_utils::hash::sha256;
use crypto_utils::scalar::{is_high, is_valid_scalar, negate};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId, Signature as EcdsaSignature};
use secp256k1::{Message, PublicKey, SECP256K1, SecretKey};
use tracing::trace;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of a message digest accepted by [`SigningKey::sign`].
pub const DIGEST_LEN: usize = 32;

/// A low-S ECDSA signature plus the recovery bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    pub recovery_id: u8,
}

impl Signature {
    /// `r || s`
    pub fn to_compact(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.r);
        out[32..].copy_from_slice(&self.s);
        out
    }

    /// `r || s || v`
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&self.to_compact());
        out[64] = self.recovery_id;
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 65 {
            return Err(HdError::InvalidSignatureLength(bytes.len()));
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        Ok(Signature {
            r,
            s,
            recovery_id: bytes[64],
        })
    }

    /// Public key that produced this signature over `digest`, or `None` if
    /// the signature does not recover to a point.
    pub fn recover(&self, digest: &[u8]) -> Result<Option<PublicKey>> {
        let msg = message(digest)?;
        let Ok(id) = RecoveryId::from_i32(self.recovery_id as i32) else {
            return Ok(None);
        };
        let Ok(sig) = RecoverableSignature::from_compact(&self.to_compact(), id) else {
            return Ok(None);
        };
        Ok(SECP256K1.recover_ecdsa(&msg, &sig).ok())
    }

    /// Move `s` into the lower half of the order.
    fn into_low_s(mut self) -> Self {
        if is_high(&self.s) {
            // negating s mirrors R, which flips the parity bit
            negate(&mut self.s);
            self.recovery_id ^= 1;
        }
        self
    }
}

fn message(digest: &[u8]) -> Result<Message> {
    if digest.len() != DIGEST_LEN {
        return Err(HdError::InvalidDigestLength(digest.len()));
    }
    Message::from_slice(digest).map_err(|_| HdError::InvalidDigestLength(digest.len()))
}

/// Owns exactly one private scalar and signs with it.
///
/// The scalar is never handed out by reference; [`SigningKey::key_pair`]
/// returns an explicit copy instead. Public key material is recomputed on
/// every call, so nothing derived from the secret outlives a dispose.
#[derive(Debug)]
pub struct SigningKey {
    secret: SecretBuffer<32>,
}

impl SigningKey {
    /// Build from raw scalar bytes: exactly 32 bytes, in `[1, n-1]`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let secret = SecretBuffer::from_slice(bytes)?;
        if !is_valid_scalar(secret.expose()?) {
            return Err(HdError::InvalidScalar);
        }
        Ok(SigningKey { secret })
    }

    /// Copy the scalar out of `key`; the two then have independent lifecycles.
    pub fn from_extended_key(key: &ExtendedKey) -> Result<Self> {
        Ok(SigningKey {
            secret: key.scalar().duplicate()?,
        })
    }

    pub fn public_key(&self) -> Result<PublicKey> {
        public_key_from_scalar(self.secret.expose()?)
    }

    /// 33-byte SEC1 compressed point.
    pub fn public_key_compressed(&self) -> Result<[u8; 33]> {
        Ok(self.public_key()?.serialize())
    }

    /// 65-byte SEC1 uncompressed point.
    pub fn public_key_uncompressed(&self) -> Result<[u8; 65]> {
        Ok(self.public_key()?.serialize_uncompressed())
    }

    /// Deterministic (RFC 6979) ECDSA over a 32-byte digest. `s` is always in
    /// the lower half of the order.
    pub fn sign(&self, digest: &[u8]) -> Result<Signature> {
        let secret = self.secret.expose()?;
        let msg = message(digest)?;

        let mut sk = SecretKey::from_slice(secret).map_err(|_| HdError::InvalidScalar)?;
        let sig = SECP256K1.sign_ecdsa_recoverable(&msg, &sk);
        sk.non_secure_erase();

        let (id, compact) = sig.serialize_compact();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&compact[..32]);
        s.copy_from_slice(&compact[32..]);
        trace!("digest signed");
        Ok(Signature {
            r,
            s,
            recovery_id: id.to_i32() as u8,
        }
        .into_low_s())
    }

    /// SHA-256 the message, then [`SigningKey::sign`].
    pub fn sign_message(&self, message: &[u8]) -> Result<Signature> {
        self.sign(&sha256(message))
    }

    /// Snapshot of the scalar and its public key. The snapshot belongs to
    /// the caller and is erased on drop or [`KeyPairSnapshot::erase`].
    pub fn key_pair(&self) -> Result<KeyPairSnapshot> {
        let public_key = self.public_key()?;
        Ok(KeyPairSnapshot {
            secret_key: *self.secret.copy_out()?,
            public_key,
        })
    }
}

impl Dispose for SigningKey {
    fn dispose(&mut self) {
        if !self.secret.is_disposed() {
            trace!("signing key disposed");
        }
        self.secret.dispose();
    }

    fn is_disposed(&self) -> bool {
        self.secret.is_disposed()
    }
}

/// Copied-out key pair.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct KeyPairSnapshot {
    secret_key: [u8; 32],
    #[zeroize(skip)]
    public_key: PublicKey,
}

impl KeyPairSnapshot {
    pub fn secret_key(&self) -> &[u8; 32] {
        &self.secret_key
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn erase(&mut self) {
        self.zeroize();
    }
}

impl std::fmt::Debug for KeyPairSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPairSnapshot")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

/// Check `signature` (64-byte `r || s`, or 65 bytes with a trailing recovery
/// byte) over `digest` against a 33- or 65-byte SEC1 public key.
///
/// Wrong digest or signature lengths are errors; every other mismatch,
/// including an unparsable key or signature, is `Ok(false)`.
pub fn verify(digest: &[u8], signature: &[u8], public_key: &[u8]) -> Result<bool> {
    let msg = message(digest)?;
    if signature.len() != 64 && signature.len() != 65 {
        return Err(HdError::InvalidSignatureLength(signature.len()));
    }
    let Ok(pk) = PublicKey::from_slice(public_key) else {
        return Ok(false);
    };
    let Ok(sig) = EcdsaSignature::from_compact(&signature[..64]) else {
        return Ok(false);
    };
    Ok(SECP256K1.verify_ecdsa(&msg, &sig, &pk).is_ok())
}
