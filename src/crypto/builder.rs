use std::sync::Arc;

use tracing::info;

use super::encoder::BatchEncoder;
use super::engine::BfvEngine;
use super::errors::{BfvError, BfvResult};
use super::params::{AUX_PRIME_BITS, BfvParams};
use crate::math::{batching_prime, generate_primes, is_ntt_friendly_prime};
use crate::rings::{BasisExtender, RnsBasis};

pub const DEFAULT_PLAINTEXT_BITS: u32 = 20;
pub const DEFAULT_COEFF_PRIME_BITS: u32 = 50;
pub const DEFAULT_COEFF_PRIME_COUNT: usize = 6;
pub const DEFAULT_ERROR_STD: f64 = 3.2;
pub const DEFAULT_REQUIRED_DEPTH: usize = 4;

pub struct BfvEngineBuilder<const DEGREE: usize> {
    plaintext_bits: Option<u32>,
    plain_modulus: Option<u64>,
    coeff_prime_bits: Option<u32>,
    coeff_prime_count: Option<usize>,
    coeff_moduli: Option<Vec<u64>>,
    error_std: Option<f64>,
    hamming_weight: Option<usize>,
    required_depth: Option<usize>,
}

impl<const DEGREE: usize> Default for BfvEngineBuilder<DEGREE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const DEGREE: usize> BfvEngineBuilder<DEGREE> {
    pub fn new() -> Self {
        Self {
            plaintext_bits: None,
            plain_modulus: None,
            coeff_prime_bits: None,
            coeff_prime_count: None,
            coeff_moduli: None,
            error_std: None,
            hamming_weight: None,
            required_depth: None,
        }
    }

    /// Bit size of the generated batching plaintext prime.
    pub fn plaintext_bits(mut self, bits: u32) -> Self {
        self.plaintext_bits = Some(bits);
        self
    }

    /// Uses an explicit plaintext modulus instead of generating one.
    pub fn plain_modulus(mut self, modulus: u64) -> Self {
        self.plain_modulus = Some(modulus);
        self
    }

    /// Generates `count` ciphertext primes of `bits` bits each.
    pub fn coeff_modulus_bits(mut self, bits: u32, count: usize) -> Self {
        self.coeff_prime_bits = Some(bits);
        self.coeff_prime_count = Some(count);
        self
    }

    /// Uses explicit ciphertext primes instead of generating them.
    pub fn coeff_moduli(mut self, moduli: Vec<u64>) -> Self {
        self.coeff_moduli = Some(moduli);
        self
    }

    pub fn error_std(mut self, std_dev: f64) -> Self {
        self.error_std = Some(std_dev);
        self
    }

    pub fn hamming_weight(mut self, weight: usize) -> Self {
        self.hamming_weight = Some(weight);
        self
    }

    /// Multiplicative depth the coefficient modulus must support.
    pub fn required_depth(mut self, depth: usize) -> Self {
        self.required_depth = Some(depth);
        self
    }

    pub fn build(self) -> BfvResult<BfvEngine<DEGREE>> {
        if DEGREE < 16 || !DEGREE.is_power_of_two() {
            return Err(BfvError::InvalidDegree { degree: DEGREE });
        }

        let plain_modulus = self.resolve_plain_modulus()?;

        let error_std = self.error_std.unwrap_or(DEFAULT_ERROR_STD);
        if !(error_std.is_finite() && error_std > 0.0) {
            return Err(BfvError::InvalidParameter {
                message: format!("error_std must be finite and positive, got {error_std}"),
            });
        }
        let hamming_weight = self.hamming_weight.unwrap_or(DEGREE / 2);
        if hamming_weight == 0 || hamming_weight > DEGREE {
            return Err(BfvError::InvalidParameter {
                message: format!("hamming_weight must be in 1..={DEGREE}, got {hamming_weight}"),
            });
        }

        let coeff_moduli = self.resolve_coeff_moduli(plain_modulus)?;
        let aux_count = BfvParams::<DEGREE>::aux_prime_count(&coeff_moduli);
        let mut exclude = coeff_moduli.clone();
        exclude.push(plain_modulus);
        let aux_moduli = generate_primes(AUX_PRIME_BITS, aux_count, DEGREE as u64, &exclude)
            .ok_or(BfvError::NotEnoughPrimes {
                bits: AUX_PRIME_BITS,
                count: aux_count,
            })?;

        let params = BfvParams {
            plain_modulus,
            coeff_moduli,
            aux_moduli,
            error_std,
            hamming_weight,
        };

        let required = self.required_depth.unwrap_or(DEFAULT_REQUIRED_DEPTH);
        let estimated = params.estimated_depth();
        if estimated < required {
            return Err(BfvError::InsufficientDepth {
                estimated,
                required,
            });
        }

        let basis = Arc::new(RnsBasis::new(params.coeff_moduli.clone())?);
        let extender = BasisExtender::new(basis.clone(), &params.aux_moduli, plain_modulus)?;
        let encoder = BatchEncoder::new(plain_modulus)?;

        info!(
            degree = DEGREE,
            plain_modulus,
            coeff_primes = params.coeff_moduli.len(),
            coeff_modulus_bits = basis.modulus_bits(),
            aux_primes = params.aux_moduli.len(),
            estimated_depth = estimated,
            "BFV engine ready"
        );

        Ok(BfvEngine::from_parts(params, basis, extender, encoder))
    }

    fn resolve_plain_modulus(&self) -> BfvResult<u64> {
        match self.plain_modulus {
            Some(modulus) => {
                if is_ntt_friendly_prime(modulus, DEGREE as u64) {
                    Ok(modulus)
                } else {
                    Err(BfvError::NonBatchingPlaintextModulus {
                        modulus,
                        degree: DEGREE,
                    })
                }
            }
            None => {
                let bits = self.plaintext_bits.unwrap_or(DEFAULT_PLAINTEXT_BITS);
                batching_prime(bits, DEGREE as u64).ok_or(BfvError::NoBatchingPrime {
                    bits,
                    degree: DEGREE,
                })
            }
        }
    }

    fn resolve_coeff_moduli(&self, plain_modulus: u64) -> BfvResult<Vec<u64>> {
        if let Some(moduli) = &self.coeff_moduli {
            if moduli.contains(&plain_modulus) {
                return Err(BfvError::InvalidParameter {
                    message: format!(
                        "plaintext modulus {plain_modulus} must not be a ciphertext prime"
                    ),
                });
            }
            // Distinctness and NTT-friendliness are checked by the basis.
            return Ok(moduli.clone());
        }
        let bits = self.coeff_prime_bits.unwrap_or(DEFAULT_COEFF_PRIME_BITS);
        let count = self.coeff_prime_count.unwrap_or(DEFAULT_COEFF_PRIME_COUNT);
        if count == 0 {
            return Err(BfvError::InvalidParameter {
                message: "coefficient modulus needs at least one prime".into(),
            });
        }
        generate_primes(bits, count, DEGREE as u64, &[plain_modulus])
            .ok_or(BfvError::NotEnoughPrimes { bits, count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rings::RnsNttError;

    #[test]
    fn default_build_matches_documented_parameters() {
        let engine = BfvEngineBuilder::<8192>::new().build().unwrap();
        let params = engine.params();
        assert_eq!(params.plain_modulus, 1_032_193);
        assert_eq!(params.coeff_moduli.len(), 6);
        assert!(params.coeff_moduli.iter().all(|&q| q >> 49 == 1));
        assert_eq!(params.aux_moduli.len(), 6);
        assert_eq!(params.hamming_weight, 4096);
        assert!(params.estimated_depth() >= 4);
    }

    #[test]
    fn rejects_tiny_degree() {
        assert!(matches!(
            BfvEngineBuilder::<8>::new().build(),
            Err(BfvError::InvalidDegree { degree: 8 })
        ));
    }

    #[test]
    fn rejects_non_batching_plain_modulus() {
        // 7681 is prime but only 1 mod 512.
        assert!(matches!(
            BfvEngineBuilder::<1024>::new().plain_modulus(7_681).build(),
            Err(BfvError::NonBatchingPlaintextModulus { modulus: 7_681, .. })
        ));
        assert!(matches!(
            BfvEngineBuilder::<1024>::new().plain_modulus(1_032_195).build(),
            Err(BfvError::NonBatchingPlaintextModulus { .. })
        ));
    }

    #[test]
    fn rejects_shallow_coefficient_modulus() {
        assert!(matches!(
            BfvEngineBuilder::<8192>::new().coeff_modulus_bits(50, 3).build(),
            Err(BfvError::InsufficientDepth { required: 4, .. })
        ));
    }

    #[test]
    fn shallow_modulus_is_accepted_when_less_depth_is_required() {
        let engine = BfvEngineBuilder::<1024>::new()
            .coeff_modulus_bits(50, 3)
            .required_depth(1)
            .build()
            .unwrap();
        assert_eq!(engine.basis().channel_count(), 3);
    }

    #[test]
    fn rejects_non_ntt_friendly_explicit_moduli() {
        // 2^61 - 1 is prime but not 1 mod 2048.
        let result = BfvEngineBuilder::<1024>::new()
            .coeff_moduli(vec![(1u64 << 61) - 1])
            .required_depth(0)
            .build();
        assert!(matches!(
            result,
            Err(BfvError::Ring {
                source: RnsNttError::NonNttFriendlyModulus { .. }
            })
        ));
    }

    #[test]
    fn rejects_bad_noise_parameters() {
        assert!(matches!(
            BfvEngineBuilder::<1024>::new().error_std(0.0).build(),
            Err(BfvError::InvalidParameter { .. })
        ));
        assert!(matches!(
            BfvEngineBuilder::<1024>::new().hamming_weight(0).build(),
            Err(BfvError::InvalidParameter { .. })
        ));
    }
}
