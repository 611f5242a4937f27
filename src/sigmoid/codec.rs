//! Fixed-point codec between integers, broadcast plaintexts and decimals.
//!
//! Every series coefficient is a multiple of `1/80640`, so for an integer
//! input the exact rational value of the polynomial is `k / 80640` for some
//! integer `k`. A decrypted result `r ∈ Z_t` is decoded by recovering
//! `k = r·80640 mod t` in `(-t/2, t/2]`. This is exact while
//! `|k| < t/2`; past that bound the value wraps silently.

use crate::crypto::{BatchEncoder, BfvResult, Plaintext};
use crate::math::{center, mul_mod};

/// Common denominator `lcm(2, 4, 48, 480, 80640)` of the series.
pub const DENOMINATOR: u64 = 80_640;

/// Replicates `value mod t` across every slot and batch-encodes it.
pub fn encode_broadcast<const DEGREE: usize>(
    encoder: &BatchEncoder<DEGREE>,
    value: u64,
) -> BfvResult<Plaintext<DEGREE>> {
    let value = value % encoder.plain_modulus();
    encoder.encode(&vec![value; encoder.slot_count()])
}

/// Slot 0 of the decoded plaintext, or 0 if decoding produced nothing.
pub fn decode_scalar<const DEGREE: usize>(
    encoder: &BatchEncoder<DEGREE>,
    plaintext: &Plaintext<DEGREE>,
) -> u64 {
    encoder.decode(plaintext).first().copied().unwrap_or(0)
}

/// Interprets `integer_result ∈ Z_t` as a fixed-point value with scale
/// [`DENOMINATOR`].
pub fn to_decimal(integer_result: u64, modulus: u64) -> f64 {
    let scaled = mul_mod(integer_result % modulus, DENOMINATOR % modulus, modulus);
    center(scaled, modulus) as f64 / DENOMINATOR as f64
}

/// Largest magnitude [`to_decimal`] represents without wrapping.
pub fn decimal_window(modulus: u64) -> f64 {
    modulus as f64 / (2 * DENOMINATOR) as f64
}
