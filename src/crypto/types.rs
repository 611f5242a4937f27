use crate::rings::RnsPoly;

/// Plaintext polynomial with coefficients in `[0, t)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plaintext<const DEGREE: usize> {
    pub coeffs: [u64; DEGREE],
    pub plain_modulus: u64,
}

impl<const DEGREE: usize> Plaintext<DEGREE> {
    /// Builds a plaintext, reducing every coefficient modulo `plain_modulus`.
    pub fn new(mut coeffs: [u64; DEGREE], plain_modulus: u64) -> Self {
        for c in &mut coeffs {
            *c %= plain_modulus;
        }
        Self {
            coeffs,
            plain_modulus,
        }
    }

    /// Coefficients lifted into `(-t/2, t/2]`.
    pub fn centered_coeffs(&self) -> Vec<i64> {
        self.coeffs
            .iter()
            .map(|&c| crate::math::center(c, self.plain_modulus))
            .collect()
    }
}

/// BFV ciphertext `(c_0, c_1, …, c_{k-1})` decrypting to
/// `c_0 + c_1·s + … + c_{k-1}·s^{k-1}`.
///
/// A fresh or relinearized ciphertext has size 2; the tensor product of two
/// size-2 ciphertexts has size 3. Components are kept in coefficient domain.
#[derive(Debug, Clone)]
pub struct Ciphertext<const DEGREE: usize> {
    pub parts: Vec<RnsPoly<DEGREE>>,
}

impl<const DEGREE: usize> Ciphertext<DEGREE> {
    pub fn size(&self) -> usize {
        self.parts.len()
    }
}
