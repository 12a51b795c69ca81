//! Fixed-width 256-bit big-endian arithmetic against the secp256k1 group order.
//!
//! Every routine walks exactly 32 bytes and allocates nothing. Values are
//! unsigned big-endian integers; reduction modulo `n` is explicit and left to
//! the caller (see [`add_and_reduce`] for the usual sequence).

use core::cmp::Ordering;
use hex_literal::hex;

/// Width of a secp256k1 scalar in bytes.
pub const SCALAR_LEN: usize = 32;

/// secp256k1 group order `n`.
pub const CURVE_ORDER: [u8; SCALAR_LEN] =
    hex!("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141");

/// `floor(n / 2)`, the largest `s` a low-S signature may carry.
pub const HALF_ORDER: [u8; SCALAR_LEN] =
    hex!("7FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF5D576E7357A4501DDFE92F46681B20A0");

/// Compare `buf` against `n`, most significant byte first.
pub fn compare_to_order(buf: &[u8; SCALAR_LEN]) -> Ordering {
    for (a, b) in buf.iter().zip(CURVE_ORDER.iter()) {
        match a.cmp(b) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// `target += addend` over 256 bits. Returns `true` when the sum carried out
/// of the top byte. The result is NOT reduced modulo `n`.
pub fn add_mod_n(target: &mut [u8; SCALAR_LEN], addend: &[u8; SCALAR_LEN]) -> bool {
    let mut carry = 0u16;
    for i in (0..SCALAR_LEN).rev() {
        let sum = target[i] as u16 + addend[i] as u16 + carry;
        target[i] = sum as u8;
        carry = sum >> 8;
    }
    carry != 0
}

/// `buf -= n` in place, wrapping modulo 2^256.
///
/// After an [`add_mod_n`] that carried, the true sum is `2^256 + buf`, so the
/// wrapped difference is exactly the reduced value.
pub fn subtract_order(buf: &mut [u8; SCALAR_LEN]) {
    let mut borrow = 0u16;
    for i in (0..SCALAR_LEN).rev() {
        let diff = (buf[i] as u16)
            .wrapping_sub(CURVE_ORDER[i] as u16)
            .wrapping_sub(borrow);
        buf[i] = diff as u8;
        borrow = (diff >> 15) & 1;
    }
}

/// True iff all 32 bytes are zero.
pub fn is_zero(buf: &[u8; SCALAR_LEN]) -> bool {
    buf.iter().fold(0u8, |acc, b| acc | b) == 0
}

/// True iff `buf` lies in `[1, n-1]`.
pub fn is_valid_scalar(buf: &[u8; SCALAR_LEN]) -> bool {
    !is_zero(buf) && compare_to_order(buf) == Ordering::Less
}

/// True iff `buf > n / 2`.
pub fn is_high(buf: &[u8; SCALAR_LEN]) -> bool {
    for (a, b) in buf.iter().zip(HALF_ORDER.iter()) {
        match a.cmp(b) {
            Ordering::Equal => continue,
            other => return other == Ordering::Greater,
        }
    }
    false
}

/// `buf = n - buf` in place, for `0 < buf < n`.
pub fn negate(buf: &mut [u8; SCALAR_LEN]) {
    let mut borrow = 0u16;
    for i in (0..SCALAR_LEN).rev() {
        let diff = (CURVE_ORDER[i] as u16)
            .wrapping_sub(buf[i] as u16)
            .wrapping_sub(borrow);
        buf[i] = diff as u8;
        borrow = (diff >> 15) & 1;
    }
}

/// `target = (target + addend) mod n` for operands already below `n`.
///
/// Both inputs being `< n` bounds the sum by `2n`, so one conditional
/// subtraction is enough.
pub fn add_and_reduce(target: &mut [u8; SCALAR_LEN], addend: &[u8; SCALAR_LEN]) {
    let carried = add_mod_n(target, addend);
    if carried || compare_to_order(target) != Ordering::Less {
        subtract_order(target);
    }
}
