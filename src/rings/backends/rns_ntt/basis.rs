use crypto_bigint::U768;

use super::errors::{RnsNttError, RnsNttResult};
use super::ntt::NttTable;
use crate::math::{bit_length, mod_inverse, mul_mod, neg_mod, sub_mod};

/// Fixed-width integer used for exact CRT reconstruction.
///
/// Must hold the product of the widest basis (ciphertext primes plus the
/// auxiliary multiplication primes) times the plaintext modulus.
pub type WideUint = U768;

/// Bit capacity of [`WideUint`].
pub const WIDE_BITS: u32 = 768;

/// RNS basis: distinct NTT-friendly primes with precomputed NTT tables and
/// Garner constants for exact reconstruction.
///
/// Invariant: `moduli.len() == ntt_tables.len()`, and the product of the
/// moduli fits in [`WideUint`] with at least one spare bit.
#[derive(Debug, Clone)]
pub struct RnsBasis<const DEGREE: usize> {
    moduli: Vec<u64>,
    ntt_tables: Vec<NttTable<DEGREE>>,
    /// `garner[i][j] = q_j^(-1) mod q_i` for `j < i`.
    garner: Vec<Vec<u64>>,
    product: WideUint,
    half_product: WideUint,
}

impl<const DEGREE: usize> RnsBasis<DEGREE> {
    pub fn new(moduli: Vec<u64>) -> RnsNttResult<Self> {
        if moduli.is_empty() {
            return Err(RnsNttError::EmptyBasis);
        }
        let bits: u32 = moduli.iter().map(|&m| bit_length(m)).sum();
        if bits >= WIDE_BITS {
            return Err(RnsNttError::BasisTooWide {
                bits,
                capacity: WIDE_BITS,
            });
        }

        let mut ntt_tables = Vec::with_capacity(moduli.len());
        for &modulus in &moduli {
            ntt_tables.push(NttTable::new(modulus)?);
        }

        let mut garner = Vec::with_capacity(moduli.len());
        for (i, &qi) in moduli.iter().enumerate() {
            let mut row = Vec::with_capacity(i);
            for &qj in &moduli[..i] {
                let inverse = mod_inverse(qj % qi, qi)
                    .ok_or(RnsNttError::DuplicateModulus { modulus: qi })?;
                row.push(inverse);
            }
            garner.push(row);
        }

        let product = moduli.iter().fold(WideUint::ONE, |acc, &m| {
            acc.wrapping_mul(&WideUint::from_u64(m))
        });
        let half_product = product.wrapping_shr(1);

        Ok(Self {
            moduli,
            ntt_tables,
            garner,
            product,
            half_product,
        })
    }

    /// Returns a basis holding `self`'s moduli followed by `other`'s.
    pub fn concat(&self, other: &[u64]) -> RnsNttResult<Self> {
        let mut moduli = self.moduli.clone();
        moduli.extend_from_slice(other);
        Self::new(moduli)
    }

    pub fn moduli(&self) -> &[u64] {
        &self.moduli
    }

    pub fn ntt_table(&self, channel: usize) -> &NttTable<DEGREE> {
        &self.ntt_tables[channel]
    }

    pub fn channel_count(&self) -> usize {
        self.moduli.len()
    }

    /// `Q = q_0 * … * q_{L-1}`.
    pub fn product(&self) -> &WideUint {
        &self.product
    }

    /// Exact bit length of `Q`.
    pub fn modulus_bits(&self) -> u32 {
        self.product.bits() as u32
    }

    /// CRT-reconstructs one coefficient and centers it in `(-Q/2, Q/2]`.
    ///
    /// Uses Garner's mixed-radix conversion: the digits are computed with
    /// word arithmetic and only the final Horner evaluation touches wide
    /// integers, so no wide modular reduction is needed.
    pub fn reconstruct(&self, residues: &[u64]) -> CenteredInt {
        debug_assert_eq!(residues.len(), self.moduli.len());
        let mut digits = Vec::with_capacity(self.moduli.len());
        for (i, (&qi, &residue)) in self.moduli.iter().zip(residues).enumerate() {
            let mut digit = residue;
            for (&previous, &inverse) in digits.iter().zip(&self.garner[i]) {
                digit = mul_mod(sub_mod(digit, previous % qi, qi), inverse, qi);
            }
            digits.push(digit);
        }

        let mut value = WideUint::ZERO;
        for (&qi, &digit) in self.moduli.iter().zip(&digits).rev() {
            value = value
                .wrapping_mul(&WideUint::from_u64(qi))
                .wrapping_add(&WideUint::from_u64(digit));
        }

        if value > self.half_product {
            CenteredInt {
                negative: true,
                magnitude: self.product.wrapping_sub(&value),
            }
        } else {
            CenteredInt {
                negative: false,
                magnitude: value,
            }
        }
    }
}

/// Signed wide integer produced by CRT reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CenteredInt {
    pub negative: bool,
    pub magnitude: WideUint,
}

impl CenteredInt {
    /// Reduces the signed value into `[0, modulus)`.
    pub fn residue(&self, modulus: u64) -> u64 {
        let r = reduce_wide(&self.magnitude, modulus);
        if self.negative { neg_mod(r, modulus) } else { r }
    }

    /// Returns the value as `i64` when it fits.
    pub fn to_i64(&self) -> Option<i64> {
        if self.magnitude.bits() >= 64 {
            return None;
        }
        let low = self.magnitude.as_words()[0] as i64;
        Some(if self.negative { -low } else { low })
    }

    /// Bit length of the magnitude.
    pub fn bits(&self) -> u32 {
        self.magnitude.bits() as u32
    }
}

/// Reduces a wide integer modulo a word-sized modulus, limb by limb from
/// the most significant end.
pub fn reduce_wide(value: &WideUint, modulus: u64) -> u64 {
    let m = modulus as u128;
    value
        .as_words()
        .iter()
        .rev()
        .fold(0u128, |acc, &word| ((acc << 64) | word as u128) % m) as u64
}

/// Floor division of a wide integer by a word-sized divisor.
pub fn div_word(value: &WideUint, divisor: u64) -> WideUint {
    let d = divisor as u128;
    let mut words = *value.as_words();
    let mut rem = 0u128;
    for word in words.iter_mut().rev() {
        let acc = (rem << 64) | *word as u128;
        *word = (acc / d) as _;
        rem = acc % d;
    }
    WideUint::from_words(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_basis() {
        assert!(matches!(
            RnsBasis::<8>::new(vec![]),
            Err(RnsNttError::EmptyBasis)
        ));
    }

    #[test]
    fn rejects_duplicate_modulus() {
        assert!(matches!(
            RnsBasis::<8>::new(vec![17, 97, 17]),
            Err(RnsNttError::DuplicateModulus { modulus: 17 })
        ));
    }

    #[test]
    fn rejects_basis_wider_than_wide_integers() {
        let moduli = crate::math::generate_primes(60, 13, 8, &[]).unwrap();
        assert!(matches!(
            RnsBasis::<8>::new(moduli),
            Err(RnsNttError::BasisTooWide { capacity: WIDE_BITS, .. })
        ));
    }

    #[test]
    fn product_matches_moduli() {
        let basis = RnsBasis::<8>::new(vec![17, 97, 113]).unwrap();
        assert_eq!(basis.product(), &WideUint::from_u64(17 * 97 * 113));
        assert_eq!(basis.modulus_bits(), 18);
        assert_eq!(basis.channel_count(), 3);
    }

    #[test]
    fn concat_appends_moduli() {
        let basis = RnsBasis::<8>::new(vec![17, 97]).unwrap();
        let extended = basis.concat(&[113]).unwrap();
        assert_eq!(extended.moduli(), &[17, 97, 113]);
        assert!(basis.concat(&[97]).is_err());
    }

    #[test]
    fn reconstruct_centered_single_channel() {
        let basis = RnsBasis::<8>::new(vec![97]).unwrap();
        assert_eq!(basis.reconstruct(&[5]).to_i64(), Some(5));
        assert_eq!(basis.reconstruct(&[96]).to_i64(), Some(-1));
    }

    #[test]
    fn reconstruct_centered_three_channels() {
        let basis = RnsBasis::<8>::new(vec![17, 97, 113]).unwrap();
        for value in [-93_000i64, -7, 0, 3, 4_242, 93_000] {
            let residues: Vec<u64> = basis
                .moduli()
                .iter()
                .map(|&m| value.rem_euclid(m as i64) as u64)
                .collect();
            assert_eq!(basis.reconstruct(&residues).to_i64(), Some(value));
        }
    }

    #[test]
    fn reconstruct_handles_wide_values() {
        let moduli = crate::math::generate_primes(50, 4, 8, &[]).unwrap();
        let basis = RnsBasis::<8>::new(moduli.clone()).unwrap();
        // -(q0 * q1 + 12345) spans more than 64 bits.
        let magnitude = WideUint::from_u64(moduli[0])
            .wrapping_mul(&WideUint::from_u64(moduli[1]))
            .wrapping_add(&WideUint::from_u64(12_345));
        let value = CenteredInt {
            negative: true,
            magnitude,
        };
        let residues: Vec<u64> = moduli.iter().map(|&m| value.residue(m)).collect();
        let back = basis.reconstruct(&residues);
        assert_eq!(back, value);
        assert_eq!(back.to_i64(), None);
    }

    #[test]
    fn reduce_wide_matches_u128_reference() {
        let value: u128 = 0x1234_5678_9abc_def0_0fed_cba9_8765_4321;
        let wide = WideUint::from_u128(value);
        for m in [17u64, 1_032_193, (1u64 << 61) - 1] {
            assert_eq!(reduce_wide(&wide, m), (value % m as u128) as u64);
        }
    }

    #[test]
    fn div_word_matches_u128_reference() {
        let value: u128 = 0xfedc_ba98_7654_3210_0123_4567_89ab_cdef;
        let wide = WideUint::from_u128(value);
        for d in [3u64, 1_032_193, u64::MAX] {
            assert_eq!(div_word(&wide, d), WideUint::from_u128(value / d as u128));
        }
    }
}
