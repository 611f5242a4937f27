//! Taylor coefficients of the logistic function as elements of `Z_t`.
//!
//! `sigmoid(x) ≈ 1/2 + x/4 - x³/48 + x⁵/480 - 17x⁷/80640`

use tracing::debug;

use super::codec::encode_broadcast;
use super::errors::{SigmoidError, SigmoidResult};
use crate::crypto::{BatchEncoder, Plaintext};
use crate::math::{add_mod, mod_pow, mul_mod, neg_mod};

/// Denominators of the series, in order of increasing degree.
pub const DENOMINATORS: [u64; 5] = [2, 4, 48, 480, 80_640];

/// `value^(modulus - 2) mod modulus`.
///
/// Fails when `value ≡ 0 (mod modulus)`, where Fermat inversion would
/// silently return zero.
pub fn modular_inverse(value: u64, modulus: u64) -> SigmoidResult<u64> {
    if modulus < 2 || value % modulus == 0 {
        return Err(SigmoidError::NotCoprime { value, modulus });
    }
    Ok(mod_pow(value % modulus, modulus - 2, modulus))
}

/// The five signed series coefficients reduced modulo `t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SigmoidScalars {
    pub modulus: u64,
    /// `1/2`
    pub half: u64,
    /// `1/4`
    pub quarter: u64,
    /// `-1/48`
    pub neg_1_48: u64,
    /// `1/480`
    pub pos_1_480: u64,
    /// `-17/80640`
    pub neg_17_80640: u64,
}

impl SigmoidScalars {
    pub fn derive(modulus: u64) -> SigmoidResult<Self> {
        let [inv_2, inv_4, inv_48, inv_480, inv_80640] =
            DENOMINATORS.map(|d| modular_inverse(d, modulus));
        Ok(Self {
            modulus,
            half: inv_2?,
            quarter: inv_4?,
            neg_1_48: neg_mod(inv_48?, modulus),
            pos_1_480: inv_480?,
            neg_17_80640: neg_mod(mul_mod(17 % modulus, inv_80640?, modulus), modulus),
        })
    }

    /// Evaluates the series at `x` in `Z_t`, without encryption.
    pub fn evaluate(&self, x: u64) -> u64 {
        let t = self.modulus;
        let x = x % t;
        let x2 = mul_mod(x, x, t);
        let x3 = mul_mod(x2, x, t);
        let x5 = mul_mod(x3, x2, t);
        let x7 = mul_mod(x5, x2, t);
        [
            self.half,
            mul_mod(self.quarter, x, t),
            mul_mod(self.neg_1_48, x3, t),
            mul_mod(self.pos_1_480, x5, t),
            mul_mod(self.neg_17_80640, x7, t),
        ]
        .into_iter()
        .fold(0, |acc, term| add_mod(acc, term, t))
    }
}

/// Coefficients as broadcast plaintexts, derived once per context.
#[derive(Debug, Clone)]
pub struct CoefficientSet<const DEGREE: usize> {
    scalars: SigmoidScalars,
    pub half: Plaintext<DEGREE>,
    pub quarter: Plaintext<DEGREE>,
    pub neg_1_48: Plaintext<DEGREE>,
    pub pos_1_480: Plaintext<DEGREE>,
    pub neg_17_80640: Plaintext<DEGREE>,
}

impl<const DEGREE: usize> CoefficientSet<DEGREE> {
    pub fn scalars(&self) -> &SigmoidScalars {
        &self.scalars
    }
}

/// Derives the coefficients for the encoder's plaintext modulus and encodes
/// each one into a broadcast plaintext.
pub fn derive_coefficients<const DEGREE: usize>(
    encoder: &BatchEncoder<DEGREE>,
) -> SigmoidResult<CoefficientSet<DEGREE>> {
    let scalars = SigmoidScalars::derive(encoder.plain_modulus())?;
    debug!(?scalars, "sigmoid coefficients derived");
    Ok(CoefficientSet {
        half: encode_broadcast(encoder, scalars.half)?,
        quarter: encode_broadcast(encoder, scalars.quarter)?,
        neg_1_48: encode_broadcast(encoder, scalars.neg_1_48)?,
        pos_1_480: encode_broadcast(encoder, scalars.pos_1_480)?,
        neg_17_80640: encode_broadcast(encoder, scalars.neg_17_80640)?,
        scalars,
    })
}

/// Reference evaluation of the series modulo `t` with no encryption.
pub fn evaluate_clear(x: u64, scalars: &SigmoidScalars) -> u64 {
    scalars.evaluate(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const T: u64 = 1_032_193;

    #[test]
    fn inverse_of_zero_is_an_error() {
        assert!(matches!(
            modular_inverse(0, T),
            Err(SigmoidError::NotCoprime { value: 0, modulus: T })
        ));
        assert!(matches!(
            modular_inverse(2 * T, T),
            Err(SigmoidError::NotCoprime { .. })
        ));
    }

    #[test]
    fn scalars_carry_signs() {
        let s = SigmoidScalars::derive(T).unwrap();
        assert_eq!(mul_mod(s.half, 2, T), 1);
        assert_eq!(mul_mod(s.quarter, 4, T), 1);
        assert_eq!(mul_mod(s.neg_1_48, 48, T), T - 1);
        assert_eq!(mul_mod(s.pos_1_480, 480, T), 1);
        assert_eq!(mul_mod(s.neg_17_80640, 80_640, T), T - 17);
    }

    #[test]
    fn rejects_modulus_dividing_a_denominator() {
        // 7 divides 80640.
        assert!(matches!(
            SigmoidScalars::derive(7),
            Err(SigmoidError::NotCoprime { value: 80_640, modulus: 7 })
        ));
    }

    #[test]
    fn clear_evaluation_at_zero_is_one_half() {
        let s = SigmoidScalars::derive(T).unwrap();
        assert_eq!(evaluate_clear(0, &s), s.half);
    }

    #[test]
    fn clear_evaluation_at_two_matches_rational_value() {
        // 1/2 + 1/2 - 1/6 + 1/15 - 17/630 = 70400/80640.
        let s = SigmoidScalars::derive(T).unwrap();
        let expected = mul_mod(70_400, modular_inverse(80_640, T).unwrap(), T);
        assert_eq!(evaluate_clear(2, &s), expected);
    }

    #[test]
    fn clear_evaluation_is_odd_around_one_half() {
        // sigmoid(x) + sigmoid(-x) = 1 for the truncated series too.
        let s = SigmoidScalars::derive(T).unwrap();
        for x in [1u64, 2, 3, 5] {
            let sum = add_mod(evaluate_clear(x, &s), evaluate_clear(T - x, &s), T);
            assert_eq!(sum, 1);
        }
    }

    proptest! {
        #[test]
        fn inverse_times_value_is_one(value in 1u64..T) {
            let inv = modular_inverse(value, T).unwrap();
            prop_assert_eq!(mul_mod(inv, value, T), 1);
        }

        #[test]
        fn inverse_holds_for_other_batching_primes(d in prop::sample::select(DENOMINATORS.to_vec())) {
            for p in [65_537u64, 786_433, 1_032_193] {
                let inv = modular_inverse(d, p).unwrap();
                prop_assert_eq!(mul_mod(inv, d, p), 1);
            }
        }
    }
}
