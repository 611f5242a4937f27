//! Secret Key (sk): Sample a "small" polynomial s(X) from R.
//! "Small" means its coefficients are small (chosen from {-1, 0, 1}).
use crate::rings::{PolySampler, RnsBasis, RnsPoly};
use rand::Rng;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SecretKeyError {
    #[error("Hamming weight {0} exceeds ring dimension {1}")]
    InvalidHammingWeight(usize, usize),
    #[error("Hamming weight must be positive")]
    ZeroHammingWeight,
}

/// Parameters for generating an RNS-encoded secret key.
pub struct SecretKeyParams<const DEGREE: usize> {
    pub basis: Arc<RnsBasis<DEGREE>>,
    pub hamming_weight: usize,
}

impl<const DEGREE: usize> SecretKeyParams<DEGREE> {
    fn validate(&self) -> Result<(), SecretKeyError> {
        if self.hamming_weight == 0 {
            Err(SecretKeyError::ZeroHammingWeight)
        } else if self.hamming_weight > DEGREE {
            Err(SecretKeyError::InvalidHammingWeight(
                self.hamming_weight,
                DEGREE,
            ))
        } else {
            Ok(())
        }
    }
}

/// RNS-encoded secret key wrapper. `s` is kept in NTT domain.
#[derive(Clone, Debug)]
pub struct SecretKey<const DEGREE: usize> {
    pub s: RnsPoly<DEGREE>,
}

impl<const DEGREE: usize> SecretKey<DEGREE> {
    /// Generate a new sparse ternary secret key in the RNS domain.
    pub fn generate<R: Rng + ?Sized>(
        params: &SecretKeyParams<DEGREE>,
        rng: &mut R,
    ) -> Result<Self, SecretKeyError> {
        params.validate()?;
        let mut s = RnsPoly::sample_tribits(params.hamming_weight, &params.basis, rng);
        s.to_ntt_domain();
        Ok(SecretKey { s })
    }

    /// `s²` in NTT domain.
    pub fn squared(&self) -> RnsPoly<DEGREE> {
        let mut s_squared = self.s.clone();
        s_squared *= &self.s;
        s_squared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rings::PolyRing;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn basis() -> Arc<RnsBasis<64>> {
        Arc::new(RnsBasis::new(vec![257, 641]).unwrap())
    }

    #[test]
    fn secret_key_has_requested_hamming_weight() {
        let params = SecretKeyParams {
            basis: basis(),
            hamming_weight: 20,
        };
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let sk = SecretKey::generate(&params, &mut rng).unwrap();
        assert!(sk.s.is_ntt_domain());

        let coeffs = sk.s.to_coeffs();
        assert_eq!(coeffs.iter().filter(|&&c| c != 0).count(), 20);
        assert!(coeffs.iter().all(|&c| (-1..=1).contains(&c)));
    }

    #[test]
    fn rejects_invalid_hamming_weight() {
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let too_heavy = SecretKeyParams {
            basis: basis(),
            hamming_weight: 65,
        };
        assert_eq!(
            SecretKey::generate(&too_heavy, &mut rng).unwrap_err(),
            SecretKeyError::InvalidHammingWeight(65, 64)
        );
        let empty = SecretKeyParams {
            basis: basis(),
            hamming_weight: 0,
        };
        assert_eq!(
            SecretKey::generate(&empty, &mut rng).unwrap_err(),
            SecretKeyError::ZeroHammingWeight
        );
    }
}
