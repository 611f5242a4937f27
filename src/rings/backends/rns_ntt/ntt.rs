//! Negacyclic number-theoretic transform over `Z_q[X] / (X^N + 1)`.
//!
//! The forward transform twists the input by powers of a primitive `2N`-th
//! root `ψ` and then runs an iterative radix-2 cyclic transform with
//! `ω = ψ²`, so slot `k` holds `a(ψ^(2k+1))`. Pointwise products in the
//! evaluation domain are negacyclic convolutions in the coefficient domain.

use super::errors::{RnsNttError, RnsNttResult};
use crate::math::{add_mod, is_ntt_friendly_prime, mod_inverse, mod_pow, mul_mod, sub_mod};

#[derive(Debug, Clone)]
pub struct NttTable<const DEGREE: usize> {
    modulus: u64,
    /// `ψ^i` for `i < N`.
    psi_powers: Vec<u64>,
    /// `ψ^(-i) · N^(-1)` for `i < N`.
    psi_inv_scaled: Vec<u64>,
    /// `ω^j` for `j < N/2`.
    omega_powers: Vec<u64>,
    /// `ω^(-j)` for `j < N/2`.
    omega_inv_powers: Vec<u64>,
}

impl<const DEGREE: usize> NttTable<DEGREE> {
    pub fn new(modulus: u64) -> RnsNttResult<Self> {
        if DEGREE < 2 || !DEGREE.is_power_of_two() {
            return Err(RnsNttError::InvalidDegree { degree: DEGREE });
        }
        let non_friendly = RnsNttError::NonNttFriendlyModulus {
            modulus,
            degree: DEGREE,
        };
        if !is_ntt_friendly_prime(modulus, DEGREE as u64) {
            return Err(non_friendly);
        }

        let psi = find_primitive_root(modulus, 2 * DEGREE).ok_or(non_friendly.clone())?;
        let psi_inv = mod_inverse(psi, modulus).ok_or(non_friendly.clone())?;
        let n_inv = mod_inverse(DEGREE as u64, modulus).ok_or(non_friendly)?;
        let omega = mul_mod(psi, psi, modulus);
        let omega_inv = mul_mod(psi_inv, psi_inv, modulus);

        let psi_powers = powers(psi, DEGREE, modulus);
        let psi_inv_scaled = powers(psi_inv, DEGREE, modulus)
            .into_iter()
            .map(|p| mul_mod(p, n_inv, modulus))
            .collect();

        Ok(Self {
            modulus,
            psi_powers,
            psi_inv_scaled,
            omega_powers: powers(omega, DEGREE / 2, modulus),
            omega_inv_powers: powers(omega_inv, DEGREE / 2, modulus),
        })
    }

    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    /// Coefficients to evaluations, in place.
    pub fn forward(&self, values: &mut [u64; DEGREE]) {
        let q = self.modulus;
        for (value, &psi) in values.iter_mut().zip(&self.psi_powers) {
            *value = mul_mod(*value, psi, q);
        }
        bit_reverse_permute(values);
        butterflies(values, &self.omega_powers, q);
    }

    /// Evaluations to coefficients, in place.
    pub fn inverse(&self, values: &mut [u64; DEGREE]) {
        let q = self.modulus;
        bit_reverse_permute(values);
        butterflies(values, &self.omega_inv_powers, q);
        for (value, &psi_inv) in values.iter_mut().zip(&self.psi_inv_scaled) {
            *value = mul_mod(*value, psi_inv, q);
        }
    }
}

fn powers(base: u64, count: usize, modulus: u64) -> Vec<u64> {
    let mut out = Vec::with_capacity(count);
    let mut acc = 1u64;
    for _ in 0..count {
        out.push(acc);
        acc = mul_mod(acc, base, modulus);
    }
    out
}

fn butterflies(values: &mut [u64], roots: &[u64], q: u64) {
    let n = values.len();
    let mut len = 2;
    while len <= n {
        let half = len / 2;
        let step = n / len;
        for start in (0..n).step_by(len) {
            for offset in 0..half {
                let left = start + offset;
                let right = left + half;
                let t = mul_mod(values[right], roots[offset * step], q);
                let u = values[left];
                values[left] = add_mod(u, t, q);
                values[right] = sub_mod(u, t, q);
            }
        }
        len <<= 1;
    }
}

fn bit_reverse_permute(values: &mut [u64]) {
    let bits = values.len().trailing_zeros();
    for i in 0..values.len() {
        let j = i.reverse_bits() >> (usize::BITS - bits);
        if i < j {
            values.swap(i, j);
        }
    }
}

/// Finds a primitive `order`-th root of unity modulo the prime `modulus`,
/// where `order` is a power of two dividing `modulus - 1`.
fn find_primitive_root(modulus: u64, order: usize) -> Option<u64> {
    let exponent = (modulus - 1) / order as u64;
    (2..modulus)
        .map(|candidate| mod_pow(candidate, exponent, modulus))
        // For a power-of-two order it suffices that root^(order/2) = -1.
        .find(|&root| mod_pow(root, (order / 2) as u64, modulus) == modulus - 1)
}
