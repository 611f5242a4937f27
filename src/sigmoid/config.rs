use crate::crypto::BfvEngineBuilder;
use crate::crypto::builder::{
    DEFAULT_COEFF_PRIME_BITS, DEFAULT_COEFF_PRIME_COUNT, DEFAULT_ERROR_STD, DEFAULT_PLAINTEXT_BITS,
};

/// Multiplicative depth of the degree-7 evaluation chain.
pub const SIGMOID_DEPTH: usize = 4;

/// Tolerance of the `sigmoid(0) = 0.5` self-test.
pub const SELF_TEST_TOLERANCE: f64 = 1e-3;

/// Scheme and key-generation settings for a [`super::SigmoidContext`].
#[derive(Debug, Clone, PartialEq)]
pub struct SigmoidConfig {
    pub plaintext_bits: u32,
    pub coeff_prime_bits: u32,
    pub coeff_prime_count: usize,
    pub error_std: f64,
    /// Secret key Hamming weight; `None` uses half the ring degree.
    pub hamming_weight: Option<usize>,
    /// Seeds key generation and encryption randomness. `None` draws from
    /// the operating system.
    pub seed: Option<u64>,
}

impl Default for SigmoidConfig {
    fn default() -> Self {
        Self {
            plaintext_bits: DEFAULT_PLAINTEXT_BITS,
            coeff_prime_bits: DEFAULT_COEFF_PRIME_BITS,
            coeff_prime_count: DEFAULT_COEFF_PRIME_COUNT,
            error_std: DEFAULT_ERROR_STD,
            hamming_weight: None,
            seed: None,
        }
    }
}

impl SigmoidConfig {
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn plaintext_bits(mut self, bits: u32) -> Self {
        self.plaintext_bits = bits;
        self
    }

    pub fn coeff_modulus_bits(mut self, bits: u32, count: usize) -> Self {
        self.coeff_prime_bits = bits;
        self.coeff_prime_count = count;
        self
    }

    pub fn error_std(mut self, std_dev: f64) -> Self {
        self.error_std = std_dev;
        self
    }

    pub fn hamming_weight(mut self, weight: usize) -> Self {
        self.hamming_weight = Some(weight);
        self
    }

    /// Engine builder requiring the depth of the sigmoid chain.
    pub fn engine_builder<const DEGREE: usize>(&self) -> BfvEngineBuilder<DEGREE> {
        let builder = BfvEngineBuilder::new()
            .plaintext_bits(self.plaintext_bits)
            .coeff_modulus_bits(self.coeff_prime_bits, self.coeff_prime_count)
            .error_std(self.error_std)
            .required_depth(SIGMOID_DEPTH);
        match self.hamming_weight {
            Some(weight) => builder.hamming_weight(weight),
            None => builder,
        }
    }
}
