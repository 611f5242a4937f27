//! BFV encryption, decryption and homomorphic evaluation.
//!
//! A ciphertext `(c_0, …, c_{k-1})` encrypts `m` when
//! `c_0 + c_1·s + … + c_{k-1}·s^{k-1} = Δ·m + e (mod Q)` with `Δ = floor(Q/t)`
//! and a small noise `e`. Decryption computes `round(t/Q · phase) mod t`.
use std::sync::Arc;

use rand::Rng;
use tracing::{debug, instrument};

use super::engine::BfvEngine;
use super::errors::{BfvError, BfvResult};
use super::types::{Ciphertext, Plaintext};
use crate::keys::{PublicKey, RelinearizationKey, SecretKey};
use crate::rings::{PolySampler, RnsPoly};

/// `Δ·m` over the ciphertext basis, with `m` lifted centered from `Z_t`.
fn scaled_plaintext<const DEGREE: usize>(
    engine: &BfvEngine<DEGREE>,
    plaintext: &Plaintext<DEGREE>,
) -> RnsPoly<DEGREE> {
    debug_assert_eq!(plaintext.plain_modulus, engine.plain_modulus());
    let mut poly = RnsPoly::from_coeffs(&plaintext.centered_coeffs(), engine.basis().clone());
    poly.mul_scalar_assign(engine.delta());
    poly
}

/// Encrypts plaintexts under a public key.
pub struct Encryptor<const DEGREE: usize> {
    engine: Arc<BfvEngine<DEGREE>>,
    public_key: PublicKey<DEGREE>,
}

impl<const DEGREE: usize> Encryptor<DEGREE> {
    pub fn new(engine: Arc<BfvEngine<DEGREE>>, public_key: PublicKey<DEGREE>) -> Self {
        Self { engine, public_key }
    }

    /// `c0 = b·u + e0 + Δ·m`, `c1 = a·u + e1` with ternary `u`.
    #[instrument(skip_all, level = "debug")]
    pub fn encrypt<R: Rng + ?Sized>(
        &self,
        plaintext: &Plaintext<DEGREE>,
        rng: &mut R,
    ) -> Ciphertext<DEGREE> {
        let params = self.engine.params();
        let basis = self.engine.basis();

        let mut u = RnsPoly::sample_tribits(params.hamming_weight, basis, rng);
        u.to_ntt_domain();
        let e0 = RnsPoly::sample_gaussian(params.error_std, basis, rng);
        let e1 = RnsPoly::sample_gaussian(params.error_std, basis, rng);

        let mut c0 = self.public_key.b.clone();
        c0 *= &u;
        c0.to_coeff_domain();
        c0 += &e0;
        c0 += &scaled_plaintext(&self.engine, plaintext);

        let mut c1 = self.public_key.a.clone();
        c1 *= &u;
        c1.to_coeff_domain();
        c1 += &e1;

        Ciphertext {
            parts: vec![c0, c1],
        }
    }
}

/// Decrypts ciphertexts. Sole holder of the secret key.
pub struct Decryptor<const DEGREE: usize> {
    engine: Arc<BfvEngine<DEGREE>>,
    secret_key: SecretKey<DEGREE>,
}

impl<const DEGREE: usize> Decryptor<DEGREE> {
    pub fn new(engine: Arc<BfvEngine<DEGREE>>, secret_key: SecretKey<DEGREE>) -> Self {
        Self { engine, secret_key }
    }

    /// `c_0 + c_1·s + …` by Horner's rule, in coefficient domain.
    fn phase(&self, ciphertext: &Ciphertext<DEGREE>) -> BfvResult<RnsPoly<DEGREE>> {
        let Some((last, rest)) = ciphertext.parts.split_last() else {
            return Err(BfvError::InvalidCiphertextSize { size: 0 });
        };
        let mut acc = last.coeff_domain_copy();
        for part in rest.iter().rev() {
            acc *= &self.secret_key.s;
            acc += part;
        }
        Ok(acc)
    }

    #[instrument(skip_all, fields(size = ciphertext.size()), level = "debug")]
    pub fn decrypt(&self, ciphertext: &Ciphertext<DEGREE>) -> BfvResult<Plaintext<DEGREE>> {
        let phase = self.phase(ciphertext)?;
        let coeffs = self.engine.extender().scale_to_plain(&phase);
        Ok(Plaintext::new(coeffs, self.engine.plain_modulus()))
    }

    /// Remaining invariant noise budget in bits.
    ///
    /// `t·phase mod Q` equals `t·e - (Q mod t)·m`; decryption stays correct
    /// while its magnitude is below `Q/2`. Zero means the result can no
    /// longer be trusted.
    pub fn noise_budget_bits(&self, ciphertext: &Ciphertext<DEGREE>) -> BfvResult<u32> {
        let mut phase = self.phase(ciphertext)?;
        phase.mul_scalar_assign(self.engine.plain_residues());
        let noise_bits = phase.max_coeff_bits();
        Ok(self
            .engine
            .basis()
            .modulus_bits()
            .saturating_sub(noise_bits + 1))
    }
}

/// Homomorphic operations. Holds no key material; the relinearization key is
/// passed to [`Evaluator::relinearize`] by reference.
pub struct Evaluator<const DEGREE: usize> {
    engine: Arc<BfvEngine<DEGREE>>,
}

impl<const DEGREE: usize> Evaluator<DEGREE> {
    pub fn new(engine: Arc<BfvEngine<DEGREE>>) -> Self {
        Self { engine }
    }

    /// Component-wise sum. Operands may differ in size.
    pub fn add(&self, lhs: &Ciphertext<DEGREE>, rhs: &Ciphertext<DEGREE>) -> Ciphertext<DEGREE> {
        let (long, short) = if lhs.size() >= rhs.size() {
            (lhs, rhs)
        } else {
            (rhs, lhs)
        };
        let mut parts = long.parts.clone();
        for (part, other) in parts.iter_mut().zip(&short.parts) {
            *part += other;
        }
        Ciphertext { parts }
    }

    pub fn add_plain(
        &self,
        ciphertext: &Ciphertext<DEGREE>,
        plaintext: &Plaintext<DEGREE>,
    ) -> BfvResult<Ciphertext<DEGREE>> {
        let mut result = ciphertext.clone();
        let first = result
            .parts
            .first_mut()
            .ok_or(BfvError::InvalidCiphertextSize { size: 0 })?;
        *first += &scaled_plaintext(&self.engine, plaintext);
        Ok(result)
    }

    /// Multiplies every component by the plaintext polynomial.
    pub fn multiply_plain(
        &self,
        ciphertext: &Ciphertext<DEGREE>,
        plaintext: &Plaintext<DEGREE>,
    ) -> Ciphertext<DEGREE> {
        let mut factor =
            RnsPoly::from_coeffs(&plaintext.centered_coeffs(), self.engine.basis().clone());
        factor.to_ntt_domain();
        let parts = ciphertext
            .parts
            .iter()
            .map(|part| {
                let mut product = part.clone();
                product *= &factor;
                product
            })
            .collect();
        Ciphertext { parts }
    }

    /// Tensor product of two size-2 ciphertexts, rescaled by `t/Q`.
    ///
    /// Returns a size-3 ciphertext; relinearize it before the next
    /// multiplication.
    #[instrument(skip_all, fields(lhs_size = lhs.size(), rhs_size = rhs.size()))]
    pub fn multiply(
        &self,
        lhs: &Ciphertext<DEGREE>,
        rhs: &Ciphertext<DEGREE>,
    ) -> BfvResult<Ciphertext<DEGREE>> {
        check_fresh(lhs)?;
        check_fresh(rhs)?;
        let a = self.lift_ntt(lhs);
        let b = self.lift_ntt(rhs);

        let mut d0 = a[0].clone();
        d0 *= &b[0];

        let mut d1 = a[0].clone();
        d1 *= &b[1];
        let mut cross = a[1].clone();
        cross *= &b[0];
        d1 += &cross;

        let mut d2 = a[1].clone();
        d2 *= &b[1];

        Ok(self.rescale(&[d0, d1, d2]))
    }

    /// `multiply(ct, ct)` with a single lift and one fewer product.
    #[instrument(skip_all, fields(size = ciphertext.size()))]
    pub fn square(&self, ciphertext: &Ciphertext<DEGREE>) -> BfvResult<Ciphertext<DEGREE>> {
        check_fresh(ciphertext)?;
        let a = self.lift_ntt(ciphertext);

        let mut d0 = a[0].clone();
        d0 *= &a[0];

        let mut d1 = a[0].clone();
        d1 *= &a[1];
        let doubled = d1.clone();
        d1 += &doubled;

        let mut d2 = a[1].clone();
        d2 *= &a[1];

        Ok(self.rescale(&[d0, d1, d2]))
    }

    /// Folds the `s²` component of a size-3 ciphertext back into size 2.
    /// Size-2 ciphertexts are returned unchanged.
    #[instrument(skip_all, fields(size = ciphertext.size()))]
    pub fn relinearize(
        &self,
        ciphertext: &Ciphertext<DEGREE>,
        relin_key: &RelinearizationKey<DEGREE>,
    ) -> BfvResult<Ciphertext<DEGREE>> {
        match ciphertext.size() {
            2 => return Ok(ciphertext.clone()),
            3 => {}
            size => return Err(BfvError::InvalidCiphertextSize { size }),
        }
        let basis = self.engine.basis();
        if relin_key.digit_count() != basis.channel_count() {
            return Err(BfvError::InvalidParameter {
                message: format!(
                    "relinearization key has {} digits, basis has {} primes",
                    relin_key.digit_count(),
                    basis.channel_count()
                ),
            });
        }

        let c2 = ciphertext.parts[2].coeff_domain_copy();
        let mut acc0 = RnsPoly::zero(basis.clone());
        let mut acc1 = RnsPoly::zero(basis.clone());
        acc0.to_ntt_domain();
        acc1.to_ntt_domain();

        for (digit, (b, a)) in relin_key.b.iter().zip(&relin_key.a).enumerate() {
            let mut d = c2.decompose_channel(digit);
            d.to_ntt_domain();
            let mut db = d.clone();
            db *= b;
            acc0 += &db;
            d *= a;
            acc1 += &d;
        }

        acc0.to_coeff_domain();
        acc1.to_coeff_domain();
        let mut c0 = ciphertext.parts[0].clone();
        c0 += &acc0;
        let mut c1 = ciphertext.parts[1].clone();
        c1 += &acc1;
        debug!("relinearized size 3 -> 2");

        Ok(Ciphertext {
            parts: vec![c0, c1],
        })
    }

    fn lift_ntt(&self, ciphertext: &Ciphertext<DEGREE>) -> Vec<RnsPoly<DEGREE>> {
        ciphertext
            .parts
            .iter()
            .map(|part| {
                let mut lifted = self.engine.extender().lift(part);
                lifted.to_ntt_domain();
                lifted
            })
            .collect()
    }

    fn rescale(&self, tensor: &[RnsPoly<DEGREE>]) -> Ciphertext<DEGREE> {
        let extender = self.engine.extender();
        Ciphertext {
            parts: tensor.iter().map(|d| extender.scale_down(d)).collect(),
        }
    }
}

fn check_fresh<const DEGREE: usize>(ciphertext: &Ciphertext<DEGREE>) -> BfvResult<()> {
    match ciphertext.size() {
        2 => Ok(()),
        size if size > 2 => Err(BfvError::NotRelinearized { size }),
        size => Err(BfvError::InvalidCiphertextSize { size }),
    }
}
