use crate::keys::SecretKey;
use crate::rings::{PolySampler, RnsBasis, RnsPoly};
use rand::Rng;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RelinearizationKeyError {
    #[error("Invalid error standard deviation: {0} (must be positive)")]
    InvalidErrorStd(f64),
    #[error("Secret key lives over a different basis")]
    BasisMismatch,
}

/// Parameters for relinearization key generation
pub struct RelinearizationKeyParams<const DEGREE: usize> {
    pub basis: Arc<RnsBasis<DEGREE>>,
    /// Standard deviation for the error distribution
    pub error_std: f64,
}

impl<const DEGREE: usize> RelinearizationKeyParams<DEGREE> {
    pub fn new(basis: Arc<RnsBasis<DEGREE>>, error_std: f64) -> Result<Self, RelinearizationKeyError> {
        let params = Self { basis, error_std };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), RelinearizationKeyError> {
        if !(self.error_std > 0.0 && self.error_std.is_finite()) {
            Err(RelinearizationKeyError::InvalidErrorStd(self.error_std))
        } else {
            Ok(())
        }
    }
}

/// Relinearization key used to transform ciphertexts after multiplication
///
/// Turns a size-3 ciphertext `(c0, c1, c2)` back into `(c0', c1')` decrypting
/// to the same plaintext. `c2` is split with the RNS gadget: digit `i` holds
/// the residues of `c2` modulo `q_i`, and the matching gadget element
/// `g_i = (Q/q_i)·((Q/q_i)^(-1) mod q_i)` is the unit vector of channel `i`.
///
/// Each pair satisfies `b_i + a_i·s = s²·g_i + e_i`. All polynomials are kept
/// in NTT domain.
#[derive(Debug, Clone)]
pub struct RelinearizationKey<const DEGREE: usize> {
    /// "b" components: b_i = -(a_i * s) + e_i + s^2 * g_i
    pub b: Vec<RnsPoly<DEGREE>>,
    /// "a" components: uniformly random polynomials
    pub a: Vec<RnsPoly<DEGREE>>,
}

impl<const DEGREE: usize> RelinearizationKey<DEGREE> {
    /// Generate one key pair per RNS channel of the ciphertext basis.
    pub fn generate<R: Rng + ?Sized>(
        secret_key: &SecretKey<DEGREE>,
        params: &RelinearizationKeyParams<DEGREE>,
        rng: &mut R,
    ) -> Result<Self, RelinearizationKeyError> {
        params.validate()?;
        let basis = &params.basis;
        if secret_key.s.basis().moduli() != basis.moduli() {
            return Err(RelinearizationKeyError::BasisMismatch);
        }

        let s_squared = secret_key.squared();
        let channels = basis.channel_count();
        let mut bs = Vec::with_capacity(channels);
        let mut as_ = Vec::with_capacity(channels);

        for digit in 0..channels {
            let mut a = RnsPoly::sample_uniform(basis, rng);
            a.to_ntt_domain();
            let e = RnsPoly::sample_gaussian(params.error_std, basis, rng);

            let mut gadget = vec![0u64; channels];
            gadget[digit] = 1;
            let mut s_squared_g = s_squared.clone();
            s_squared_g.mul_scalar_assign(&gadget);

            let mut a_times_s = a.clone();
            a_times_s *= &secret_key.s;

            let mut b = -a_times_s;
            b += &e;
            b += &s_squared_g;

            bs.push(b);
            as_.push(a);
        }

        Ok(RelinearizationKey { b: bs, a: as_ })
    }

    /// Number of gadget digits.
    pub fn digit_count(&self) -> usize {
        self.b.len()
    }
}
