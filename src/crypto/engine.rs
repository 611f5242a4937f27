use std::sync::Arc;

use rand::Rng;
use tracing::{info, instrument};

use super::builder::BfvEngineBuilder;
use super::encoder::BatchEncoder;
use super::errors::BfvResult;
use super::params::BfvParams;
use crate::keys::{
    PublicKey, PublicKeyParams, RelinearizationKey, RelinearizationKeyParams, SecretKey,
    SecretKeyParams,
};
use crate::rings::{BasisExtender, RnsBasis, WideUint, div_word, reduce_wide};

/// Immutable BFV context: parameters, ciphertext basis, basis extender for
/// multiplication and the batch encoder. Shared by reference between the
/// encryptor, decryptor and evaluator.
#[derive(Debug)]
pub struct BfvEngine<const DEGREE: usize> {
    params: BfvParams<DEGREE>,
    basis: Arc<RnsBasis<DEGREE>>,
    extender: BasisExtender<DEGREE>,
    encoder: BatchEncoder<DEGREE>,
    /// `Δ = floor(Q/t)` reduced modulo each ciphertext prime.
    delta: Vec<u64>,
    /// `t` reduced modulo each ciphertext prime.
    plain_residues: Vec<u64>,
}

impl<const DEGREE: usize> BfvEngine<DEGREE> {
    pub fn builder() -> BfvEngineBuilder<DEGREE> {
        BfvEngineBuilder::new()
    }

    pub(crate) fn from_parts(
        params: BfvParams<DEGREE>,
        basis: Arc<RnsBasis<DEGREE>>,
        extender: BasisExtender<DEGREE>,
        encoder: BatchEncoder<DEGREE>,
    ) -> Self {
        let t = params.plain_modulus;
        let delta_wide: WideUint = div_word(basis.product(), t);
        let delta = basis
            .moduli()
            .iter()
            .map(|&q| reduce_wide(&delta_wide, q))
            .collect();
        let plain_residues = basis.moduli().iter().map(|&q| t % q).collect();
        Self {
            params,
            basis,
            extender,
            encoder,
            delta,
            plain_residues,
        }
    }

    pub fn params(&self) -> &BfvParams<DEGREE> {
        &self.params
    }

    pub fn basis(&self) -> &Arc<RnsBasis<DEGREE>> {
        &self.basis
    }

    pub fn extender(&self) -> &BasisExtender<DEGREE> {
        &self.extender
    }

    pub fn encoder(&self) -> &BatchEncoder<DEGREE> {
        &self.encoder
    }

    pub fn plain_modulus(&self) -> u64 {
        self.params.plain_modulus
    }

    pub(crate) fn delta(&self) -> &[u64] {
        &self.delta
    }

    pub(crate) fn plain_residues(&self) -> &[u64] {
        &self.plain_residues
    }

    #[instrument(skip(self, rng), fields(hamming_weight = self.params.hamming_weight))]
    pub fn generate_secret_key<R: Rng + ?Sized>(&self, rng: &mut R) -> BfvResult<SecretKey<DEGREE>> {
        let sk_params = SecretKeyParams {
            basis: self.basis.clone(),
            hamming_weight: self.params.hamming_weight,
        };
        Ok(SecretKey::generate(&sk_params, rng)?)
    }

    #[instrument(skip_all)]
    pub fn generate_public_key<R: Rng + ?Sized>(
        &self,
        secret_key: &SecretKey<DEGREE>,
        rng: &mut R,
    ) -> BfvResult<PublicKey<DEGREE>> {
        let pk_params = PublicKeyParams {
            basis: self.basis.clone(),
            error_std: self.params.error_std,
        };
        Ok(PublicKey::generate(secret_key, &pk_params, rng)?)
    }

    /// Generate a relinearization key for ciphertext multiplication
    #[instrument(skip_all, fields(digits = self.basis.channel_count()))]
    pub fn generate_relinearization_key<R: Rng + ?Sized>(
        &self,
        secret_key: &SecretKey<DEGREE>,
        rng: &mut R,
    ) -> BfvResult<RelinearizationKey<DEGREE>> {
        let relin_params =
            RelinearizationKeyParams::new(self.basis.clone(), self.params.error_std)?;
        let key = RelinearizationKey::generate(secret_key, &relin_params, rng)?;
        info!(digits = key.digit_count(), "relinearization key generated");
        Ok(key)
    }
}
