use crate::curve::public_key_from_scalar;
use crate::error::{HdError, Result};
use crate::path::{ChildIndex, DerivationPath};
use crate::secret::{Dispose, SecretBuffer};
use crate::seed::Seed;
use crypto_utils::hmac::{hmac_sha512, split_halves};
use crypto_utils::scalar::{add_and_reduce, compare_to_order, is_valid_scalar, is_zero};
use secp256k1::PublicKey;
use std::cmp::Ordering;
use tracing::{debug, warn};
use zeroize::Zeroizing;

/// HMAC key for master key generation.
const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";

/// Length of the CKDpriv HMAC message: 33 key bytes + 4 index bytes.
const CHILD_DATA_LEN: usize = 37;

/// A private scalar with its chain code and the path that produced it.
///
/// Not `Clone`: each derived key has exactly one owner. Both secrets are wiped
/// on [`Dispose::dispose`] or drop.
#[derive(Debug)]
pub struct ExtendedKey {
    private_key: SecretBuffer<32>,
    chain_code: SecretBuffer<32>,
    path: DerivationPath,
    child_index: u32,
}

/// Outcome of a single CKDpriv step.
#[derive(Debug)]
pub enum DerivationStep {
    Valid(ExtendedKey),
    /// `IL >= n` or the child scalar came out zero.
    Skipped,
}

impl ExtendedKey {
    /// Master key: `I = HMAC-SHA512("Bitcoin seed", seed)`, `IL` is the
    /// scalar, `IR` the chain code.
    pub fn new_master(seed: &Seed) -> Result<Self> {
        let i = hmac_sha512(MASTER_HMAC_KEY, seed.as_bytes()?);
        let master = Self::master_from_hmac(&i)?;
        debug!(seed_len = seed.len(), "master key generated");
        Ok(master)
    }

    /// Master key from the HMAC output; `IL` must lie in `[1, n-1]`.
    fn master_from_hmac(i: &[u8; 64]) -> Result<Self> {
        let (il, ir) = split_halves(i);
        if !is_valid_scalar(&il) {
            return Err(HdError::InvalidMasterKey);
        }
        Ok(ExtendedKey {
            private_key: SecretBuffer::from_slice(&il[..])?,
            chain_code: SecretBuffer::from_slice(&ir[..])?,
            path: DerivationPath::master(),
            child_index: 0,
        })
    }

    /// Child key derivation for private keys (CKDpriv).
    ///
    /// Hardened: `0x00 || k_par || ser32(i)`; normal: `serP(K_par) || ser32(i)`.
    /// The child scalar is `(k_par + IL) mod n` and its chain code is `IR`.
    pub fn derive_child(&self, child: ChildIndex) -> Result<DerivationStep> {
        let parent = self.private_key.expose()?;
        let mut data = Zeroizing::new([0u8; CHILD_DATA_LEN]);
        if child.hardened {
            data[1..33].copy_from_slice(parent);
        } else {
            let parent_pub = public_key_from_scalar(parent)?;
            data[..33].copy_from_slice(&parent_pub.serialize());
        }
        data[33..].copy_from_slice(&child.raw().to_be_bytes());

        let i = hmac_sha512(self.chain_code.expose()?, &data[..]);
        self.step_from_hmac(child, &i)
    }

    /// Everything CKDpriv does after the HMAC.
    fn step_from_hmac(&self, child: ChildIndex, i: &[u8; 64]) -> Result<DerivationStep> {
        let (il, ir) = split_halves(i);
        if compare_to_order(&il) != Ordering::Less {
            warn!(parent = %self.path, index = %child, "IL outside the curve order, child skipped");
            return Ok(DerivationStep::Skipped);
        }

        let mut child_key = self.private_key.duplicate()?;
        add_and_reduce(child_key.expose_mut()?, &il);
        if is_zero(child_key.expose()?) {
            warn!(parent = %self.path, index = %child, "child scalar is zero, child skipped");
            return Ok(DerivationStep::Skipped);
        }

        let mut path = self.path.clone();
        path.push(child);
        Ok(DerivationStep::Valid(ExtendedKey {
            private_key: child_key,
            chain_code: SecretBuffer::from_slice(&ir[..])?,
            path,
            child_index: child.raw(),
        }))
    }

    /// Record a segment that produced no key: metadata advances, the scalar
    /// and chain code do not.
    pub(crate) fn record_skipped(&mut self, child: ChildIndex) {
        self.path.push(child);
        self.child_index = child.raw();
    }

    /// Copy of the private scalar. The copy wipes itself on drop.
    pub fn private_key(&self) -> Result<Zeroizing<[u8; 32]>> {
        self.private_key.copy_out()
    }

    pub fn chain_code(&self) -> Result<Zeroizing<[u8; 32]>> {
        self.chain_code.copy_out()
    }

    pub fn public_key(&self) -> Result<PublicKey> {
        public_key_from_scalar(self.private_key.expose()?)
    }

    pub fn path(&self) -> &DerivationPath {
        &self.path
    }

    /// Number of path segments walked, skipped ones included.
    pub fn depth(&self) -> usize {
        self.path.depth()
    }

    /// Raw index of the last segment (hardened offset applied), 0 for master.
    pub fn child_index(&self) -> u32 {
        self.child_index
    }

    pub(crate) fn scalar(&self) -> &SecretBuffer<32> {
        &self.private_key
    }

    pub(crate) fn duplicate(&self) -> Result<Self> {
        Ok(ExtendedKey {
            private_key: self.private_key.duplicate()?,
            chain_code: self.chain_code.duplicate()?,
            path: self.path.clone(),
            child_index: self.child_index,
        })
    }
}

impl Dispose for ExtendedKey {
    fn dispose(&mut self) {
        self.private_key.dispose();
        self.chain_code.dispose();
    }

    fn is_disposed(&self) -> bool {
        self.private_key.is_disposed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::HARDENED_OFFSET;
    use crypto_utils::scalar::CURVE_ORDER;
    use hex_literal::hex;

    fn master(seed_hex: &str) -> ExtendedKey {
        ExtendedKey::new_master(&Seed::from_hex(seed_hex).unwrap()).unwrap()
    }

    fn valid(step: DerivationStep) -> ExtendedKey {
        match step {
            DerivationStep::Valid(k) => k,
            DerivationStep::Skipped => panic!("step unexpectedly skipped"),
        }
    }

    fn assert_key(key: &ExtendedKey, private_key: [u8; 32], chain_code: [u8; 32]) {
        assert_eq!(*key.private_key().unwrap(), private_key, "private key at {}", key.path());
        assert_eq!(*key.chain_code().unwrap(), chain_code, "chain code at {}", key.path());
    }

    /// BIP32 Test vector 1
    #[test]
    fn test_vector1() {
        let m = master("000102030405060708090a0b0c0d0e0f");
        assert_key(
            &m,
            hex!("e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b35"),
            hex!("873dff81c02f525623fd1fe5167eac3a55a049de3d314bb42ee227ffed37d508"),
        );
        assert_eq!(
            m.public_key().unwrap().serialize(),
            hex!("0339a36013301597daef41fbe593a02cc513d0b55527ec2df1050e2e8ff49c85c2")
        );

        // Chain m/0H
        let m0h = valid(m.derive_child(ChildIndex::hardened(0).unwrap()).unwrap());
        assert_key(
            &m0h,
            hex!("edb2e14f9ee77d26dd93b4ecede8d16ed408ce149b6cd80b0715a2d911a0afea"),
            hex!("47fdacbd0f1097043b78c63c20c34ef4ed9a111d980047ad16282c7ae6236141"),
        );

        // Chain m/0H/1
        let m0h1 = valid(m0h.derive_child(ChildIndex::normal(1).unwrap()).unwrap());
        assert_key(
            &m0h1,
            hex!("3c6cb8d0f6a264c91ea8b5030fadaa8e538b020f0a387421a12de9319dc93368"),
            hex!("2a7857631386ba23dacac34180dd1983734e444fdbf774041578e9b6adb37c19"),
        );

        // Chain m/0H/1/2H
        let m0h1_2h = valid(m0h1.derive_child(ChildIndex::hardened(2).unwrap()).unwrap());
        assert_key(
            &m0h1_2h,
            hex!("cbce0d719ecf7431d88e6a89fa1483e02e35092af60c042b1df2ff59fa424dca"),
            hex!("04466b9cc8e161e966409ca52986c584f07e9dc81f735db683c3ff6ec7b1503f"),
        );
        assert_eq!(m0h1_2h.path().to_string(), "m/0'/1/2'");
        assert_eq!(m0h1_2h.depth(), 3);
        assert_eq!(m0h1_2h.child_index(), HARDENED_OFFSET + 2);
    }

    #[test]
    fn master_rejects_out_of_range_il() {
        let mut i = [0x5a; 64];
        for il in [[0u8; 32], CURVE_ORDER, [0xff; 32]] {
            i[..32].copy_from_slice(&il);
            assert_eq!(
                ExtendedKey::master_from_hmac(&i).unwrap_err(),
                HdError::InvalidMasterKey
            );
        }

        // n - 1 is the largest usable master scalar
        let mut top = CURVE_ORDER;
        top[31] -= 1;
        i[..32].copy_from_slice(&top);
        let m = ExtendedKey::master_from_hmac(&i).unwrap();
        assert_eq!(*m.private_key().unwrap(), top);
        assert_eq!(*m.chain_code().unwrap(), [0x5a; 32]);
        assert_eq!(m.depth(), 0);
    }

    #[test]
    fn invalid_il_is_skipped() {
        let m = master("000102030405060708090a0b0c0d0e0f");
        let mut i = [0u8; 64];
        i[..32].copy_from_slice(&CURVE_ORDER);
        let step = m.step_from_hmac(ChildIndex::normal(0).unwrap(), &i).unwrap();
        assert!(matches!(step, DerivationStep::Skipped));

        i[..32].copy_from_slice(&[0xff; 32]);
        let step = m.step_from_hmac(ChildIndex::normal(0).unwrap(), &i).unwrap();
        assert!(matches!(step, DerivationStep::Skipped));
    }

    #[test]
    fn zero_child_scalar_is_skipped() {
        let m = master("000102030405060708090a0b0c0d0e0f");
        // IL = n - k_par makes k_par + IL = n = 0 (mod n)
        let mut il = CURVE_ORDER;
        let k = m.private_key().unwrap();
        let mut borrow = 0u16;
        for idx in (0..32).rev() {
            let diff = (il[idx] as u16).wrapping_sub(k[idx] as u16).wrapping_sub(borrow);
            il[idx] = diff as u8;
            borrow = (diff >> 15) & 1;
        }
        let mut i = [0u8; 64];
        i[..32].copy_from_slice(&il);
        let step = m.step_from_hmac(ChildIndex::hardened(5).unwrap(), &i).unwrap();
        assert!(matches!(step, DerivationStep::Skipped));
    }

    #[test]
    fn record_skipped_keeps_secrets() {
        let mut m = master("000102030405060708090a0b0c0d0e0f");
        let before = m.private_key().unwrap();
        let cc = m.chain_code().unwrap();
        m.record_skipped(ChildIndex::hardened(3).unwrap());
        assert_eq!(m.private_key().unwrap(), before);
        assert_eq!(m.chain_code().unwrap(), cc);
        assert_eq!(m.path().to_string(), "m/3'");
        assert_eq!(m.child_index(), HARDENED_OFFSET + 3);
    }

    #[test]
    fn disposed_key_cannot_derive() {
        let mut m = master("000102030405060708090a0b0c0d0e0f");
        m.dispose();
        m.dispose();
        assert!(m.is_disposed());
        assert_eq!(
            m.derive_child(ChildIndex::normal(0).unwrap()).unwrap_err(),
            HdError::DisposedKey
        );
        assert_eq!(m.private_key().unwrap_err(), HdError::DisposedKey);
        assert_eq!(m.public_key().unwrap_err(), HdError::DisposedKey);
    }

    #[test]
    fn debug_output_is_redacted() {
        let m = master("000102030405060708090a0b0c0d0e0f");
        let shown = format!("{m:?}").to_lowercase();
        assert!(!shown.contains("e8f32e72"));
        assert!(!shown.contains("232, 243"));
    }
}
