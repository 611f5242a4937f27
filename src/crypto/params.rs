//! Parameter set for the leveled BFV scheme.

/// Bits of the auxiliary primes used to hold tensor products exactly.
pub const AUX_PRIME_BITS: u32 = 61;

/// Resolved scheme parameters.
///
/// `coeff_moduli` form the ciphertext basis `Q`; `aux_moduli` extend it to
/// `Q·P` with `P > 4·N·Q`, large enough that the tensor product of two
/// ciphertexts is computed without wrap-around before rescaling by `t/Q`.
#[derive(Debug, Clone, PartialEq)]
pub struct BfvParams<const DEGREE: usize> {
    pub plain_modulus: u64,
    pub coeff_moduli: Vec<u64>,
    pub aux_moduli: Vec<u64>,
    pub error_std: f64,
    pub hamming_weight: usize,
}

impl<const DEGREE: usize> BfvParams<DEGREE> {
    /// `log2(Q)`.
    pub fn coeff_modulus_log2(&self) -> f64 {
        self.coeff_moduli.iter().map(|&q| (q as f64).log2()).sum()
    }

    /// Initial invariant noise budget in bits: `log2(Q) - log2(t) - 1`.
    pub fn initial_noise_budget(&self) -> f64 {
        self.coeff_modulus_log2() - (self.plain_modulus as f64).log2() - 1.0
    }

    /// Conservative estimate of how many sequential ciphertext
    /// multiplications (each followed by relinearization) still decrypt.
    ///
    /// The baseline is the relinearization noise, which dominates fresh
    /// encryption noise: one gadget digit of `max(q_i)` bits times a key
    /// error, summed over `k` digits and `N` coefficients, plus a safety
    /// margin. Every multiplication then costs about `log2(t·N) + 2` bits.
    pub fn estimated_depth(&self) -> usize {
        let log_n = (DEGREE as f64).log2();
        let log_t = (self.plain_modulus as f64).log2();
        let max_prime_bits = self
            .coeff_moduli
            .iter()
            .map(|&q| (q as f64).log2())
            .fold(0.0, f64::max);
        let digits = (self.coeff_moduli.len().max(1) as f64).log2().ceil();

        let baseline = max_prime_bits + digits + log_n / 2.0 + 4.0;
        let per_level = log_t + log_n + 2.0;
        let spare = self.initial_noise_budget() - baseline;
        if spare <= 0.0 {
            0
        } else {
            (spare / per_level).floor() as usize
        }
    }

    /// Number of auxiliary primes so that `P > 4·N·Q`.
    pub fn aux_prime_count(coeff_moduli: &[u64]) -> usize {
        let q_bits: u32 = coeff_moduli.iter().map(|&q| crate::math::bit_length(q)).sum();
        let needed = q_bits + DEGREE.trailing_zeros() + 2;
        needed.div_ceil(AUX_PRIME_BITS - 1) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{batching_prime, generate_primes};

    fn params_with(count: usize) -> BfvParams<8192> {
        let t = batching_prime(20, 8192).unwrap();
        BfvParams {
            plain_modulus: t,
            coeff_moduli: generate_primes(50, count, 8192, &[t]).unwrap(),
            aux_moduli: vec![],
            error_std: 3.2,
            hamming_weight: 4096,
        }
    }

    #[test]
    fn default_chain_supports_depth_four() {
        let params = params_with(6);
        assert!(params.estimated_depth() >= 4);
        assert!((params.initial_noise_budget() - 279.0).abs() < 1.0);
    }

    #[test]
    fn short_chain_is_too_shallow() {
        assert!(params_with(3).estimated_depth() < 4);
        assert!(params_with(4).estimated_depth() < 4);
    }

    #[test]
    fn depth_grows_with_chain_length() {
        let depths: Vec<usize> = (2..=8).map(|k| params_with(k).estimated_depth()).collect();
        assert!(depths.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(params_with(1).estimated_depth(), 0);
    }

    #[test]
    fn aux_count_covers_tensor_growth() {
        let moduli = vec![(1u64 << 50) - 27; 6];
        // 300 + 13 + 2 bits over 60-bit steps.
        assert_eq!(BfvParams::<8192>::aux_prime_count(&moduli), 6);
    }
}
