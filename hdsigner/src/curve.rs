use crate::error::{HdError, Result};
use crypto_utils::scalar::CURVE_ORDER;
use hex_literal::hex;
use secp256k1::{PublicKey, SECP256K1, SecretKey};

/// Domain parameters of the curve the engine works over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurveParameters {
    /// Group order.
    pub n: [u8; 32],
    /// Generator, SEC1 compressed.
    pub g: [u8; 33],
    /// Field prime.
    pub p: [u8; 32],
}

pub const SECP256K1_PARAMS: CurveParameters = CurveParameters {
    n: CURVE_ORDER,
    g: hex!("0279BE667EF9DCBBAC55A06295CE870B07029BFCDB2DCE28D959F2815B16F81798"),
    p: hex!("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFC2F"),
};

/// `scalar * G`. The temporary `SecretKey` is erased before returning.
pub(crate) fn public_key_from_scalar(scalar: &[u8; 32]) -> Result<PublicKey> {
    let mut sk = SecretKey::from_slice(scalar).map_err(|_| HdError::InvalidScalar)?;
    let pk = PublicKey::from_secret_key(SECP256K1, &sk);
    sk.non_secure_erase();
    Ok(pk)
}
