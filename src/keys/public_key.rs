use crate::keys::SecretKey;
use crate::rings::{PolySampler, RnsBasis, RnsPoly};
use rand::Rng;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PublicKeyError {
    #[error("Invalid error standard deviation: {0} (must be positive)")]
    InvalidErrorStd(f64),
    #[error("Secret key lives over a different basis")]
    BasisMismatch,
}

/// Parameters for generating an RNS-encoded public key.
pub struct PublicKeyParams<const DEGREE: usize> {
    pub basis: Arc<RnsBasis<DEGREE>>,
    /// Standard deviation for the error distribution
    pub error_std: f64,
}

impl<const DEGREE: usize> PublicKeyParams<DEGREE> {
    fn validate(&self) -> Result<(), PublicKeyError> {
        if !(self.error_std > 0.0 && self.error_std.is_finite()) {
            Err(PublicKeyError::InvalidErrorStd(self.error_std))
        } else {
            Ok(())
        }
    }
}

/// RNS-encoded public key (RLWE sample), both components in NTT domain.
#[derive(Clone, Debug)]
pub struct PublicKey<const DEGREE: usize> {
    /// "b" component: b = -(a * s) + e
    pub b: RnsPoly<DEGREE>,
    /// "a" component: uniformly random
    pub a: RnsPoly<DEGREE>,
}

impl<const DEGREE: usize> PublicKey<DEGREE> {
    /// Generate a new RLWE public key under RNS.
    pub fn generate<R: Rng + ?Sized>(
        secret_key: &SecretKey<DEGREE>,
        params: &PublicKeyParams<DEGREE>,
        rng: &mut R,
    ) -> Result<Self, PublicKeyError> {
        params.validate()?;
        if secret_key.s.basis().moduli() != params.basis.moduli() {
            return Err(PublicKeyError::BasisMismatch);
        }

        let mut a = RnsPoly::sample_uniform(&params.basis, rng);
        a.to_ntt_domain();
        let e = RnsPoly::sample_gaussian(params.error_std, &params.basis, rng);

        let mut a_times_s = a.clone();
        a_times_s *= &secret_key.s;

        let mut b = -a_times_s;
        b += &e;

        Ok(PublicKey { b, a })
    }
}
