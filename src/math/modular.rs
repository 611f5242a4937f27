//! Word-sized modular arithmetic.
//!
//! All helpers assume operands are already reduced modulo `q` and that
//! `q < 2^63`, so a sum of two residues never overflows a `u64`.

/// Computes `(a + b) mod q` for reduced operands.
#[inline]
pub fn add_mod(a: u64, b: u64, q: u64) -> u64 {
    let s = a + b;
    if s >= q { s - q } else { s }
}

/// Computes `(a - b) mod q` for reduced operands.
#[inline]
pub fn sub_mod(a: u64, b: u64, q: u64) -> u64 {
    if a >= b { a - b } else { a + q - b }
}

/// Computes `(a * b) mod q` using `u128` intermediate arithmetic.
#[inline]
pub fn mul_mod(a: u64, b: u64, q: u64) -> u64 {
    debug_assert!(q > 0, "mul_mod: modulus must be positive");
    ((a as u128 * b as u128) % q as u128) as u64
}

/// Computes `-a mod q` for a reduced operand.
#[inline]
pub fn neg_mod(a: u64, q: u64) -> u64 {
    if a == 0 { 0 } else { q - a }
}

/// Computes `base^exponent mod modulus` by square-and-multiply.
///
/// # Panics
///
/// Panics if `modulus == 0`.
pub fn mod_pow(mut base: u64, mut exponent: u64, modulus: u64) -> u64 {
    assert!(modulus > 0, "mod_pow: modulus must be positive");
    if modulus == 1 {
        return 0;
    }
    let mut acc = 1u64;
    base %= modulus;
    while exponent > 0 {
        if exponent & 1 == 1 {
            acc = mul_mod(acc, base, modulus);
        }
        base = mul_mod(base, base, modulus);
        exponent >>= 1;
    }
    acc
}

/// Multiplicative inverse of `value` modulo the prime `modulus`.
///
/// Uses Fermat's little theorem, `value^(p-2) ≡ value^(-1) (mod p)`, so the
/// result is only meaningful when `modulus` is prime. Returns `None` when
/// `value ≡ 0 (mod modulus)`, the one residue with no inverse.
pub fn mod_inverse(value: u64, modulus: u64) -> Option<u64> {
    if modulus < 2 || value % modulus == 0 {
        return None;
    }
    Some(mod_pow(value, modulus - 2, modulus))
}

/// Lifts a residue in `[0, modulus)` to its centered representative in
/// `(-modulus/2, modulus/2]`.
#[inline]
pub fn center(value: u64, modulus: u64) -> i64 {
    debug_assert!(value < modulus);
    if value > modulus / 2 {
        -((modulus - value) as i64)
    } else {
        value as i64
    }
}

/// Reduces a signed integer into `[0, modulus)`.
#[inline]
pub fn reduce_signed(value: i64, modulus: u64) -> u64 {
    (value as i128).rem_euclid(modulus as i128) as u64
}

/// Bit length of `value` (`0` for zero).
#[inline]
pub fn bit_length(value: u64) -> u32 {
    u64::BITS - value.leading_zeros()
}
