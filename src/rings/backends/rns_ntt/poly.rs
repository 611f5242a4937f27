use super::{
    basis::RnsBasis,
    errors::{RnsNttError, RnsNttResult},
};
use crate::{
    math::{
        add_mod, gaussian_coefficients, mul_mod, neg_mod, reduce_signed, sub_mod,
        ternary_coefficients, uniform_coefficients,
    },
    rings::traits::{PolyRing, PolySampler},
};
use rand::Rng;
use std::{
    ops::{AddAssign, MulAssign, Neg, SubAssign},
    sync::Arc,
};

/// A polynomial in `Z_{q_0} x … x Z_{q_{L-1}}[X] / (X^N + 1)`.
///
/// Stores one `[u64; DEGREE]` array per RNS channel. The `in_ntt_domain` flag
/// tracks whether the arrays hold coefficient-domain or NTT-domain values.
///
/// # Invariants
/// - `channels.len() == basis.channel_count()`
/// - Every `channels[i][j] < basis.moduli()[i]`
#[derive(Clone, Debug)]
pub struct RnsPoly<const DEGREE: usize> {
    channels: Vec<[u64; DEGREE]>,
    basis: Arc<RnsBasis<DEGREE>>,
    in_ntt_domain: bool,
}

// ─── Constructors ─────────────────────────────────────────────────────────────

impl<const DEGREE: usize> RnsPoly<DEGREE> {
    /// Creates the zero polynomial in coefficient domain.
    pub fn zero(basis: Arc<RnsBasis<DEGREE>>) -> Self {
        let channels = vec![[0u64; DEGREE]; basis.channel_count()];
        Self {
            channels,
            basis,
            in_ntt_domain: false,
        }
    }

    /// Creates a polynomial from signed integer coefficients.
    ///
    /// Each coefficient is reduced into `[0, q_i)` per channel. Missing
    /// trailing coefficients are zero; extra ones are ignored.
    pub fn from_coeffs(coeffs: &[i64], basis: Arc<RnsBasis<DEGREE>>) -> Self {
        let mut channels = vec![[0u64; DEGREE]; basis.channel_count()];
        for (channel, &q) in channels.iter_mut().zip(basis.moduli()) {
            for (slot, &coeff) in channel.iter_mut().zip(coeffs) {
                *slot = reduce_signed(coeff, q);
            }
        }
        Self {
            channels,
            basis,
            in_ntt_domain: false,
        }
    }

    /// Creates a polynomial from pre-built channel arrays.
    ///
    /// Returns an error if the channel count doesn't match the basis, or if any
    /// coefficient is not reduced.
    pub fn from_channels(
        channels: Vec<[u64; DEGREE]>,
        basis: Arc<RnsBasis<DEGREE>>,
        in_ntt_domain: bool,
    ) -> RnsNttResult<Self> {
        let expected = basis.channel_count();
        let actual = channels.len();
        if actual != expected {
            return Err(RnsNttError::ChannelCountMismatch { expected, actual });
        }
        for (channel, &q) in channels.iter().zip(basis.moduli()) {
            if let Some(&c) = channel.iter().find(|&&c| c >= q) {
                return Err(RnsNttError::NonReducedCoefficient {
                    coefficient: c,
                    modulus: q,
                });
            }
        }
        Ok(Self {
            channels,
            basis,
            in_ntt_domain,
        })
    }

    // Skips the O(N·L) reducedness check; callers build reduced channels.
    pub(crate) fn new_unchecked(
        channels: Vec<[u64; DEGREE]>,
        basis: Arc<RnsBasis<DEGREE>>,
        in_ntt_domain: bool,
    ) -> Self {
        debug_assert_eq!(channels.len(), basis.channel_count());
        Self {
            channels,
            basis,
            in_ntt_domain,
        }
    }
}

// ─── Accessors & domain conversion ───────────────────────────────────────────

impl<const DEGREE: usize> RnsPoly<DEGREE> {
    pub fn channels(&self) -> &[[u64; DEGREE]] {
        &self.channels
    }

    pub fn basis(&self) -> &Arc<RnsBasis<DEGREE>> {
        &self.basis
    }

    pub fn is_ntt_domain(&self) -> bool {
        self.in_ntt_domain
    }

    /// Converts to NTT domain in-place (no-op if already there).
    pub fn to_ntt_domain(&mut self) {
        if self.in_ntt_domain {
            return;
        }
        for (ch, channel) in self.channels.iter_mut().enumerate() {
            self.basis.ntt_table(ch).forward(channel);
        }
        self.in_ntt_domain = true;
    }

    /// Converts to coefficient domain in-place (no-op if already there).
    pub fn to_coeff_domain(&mut self) {
        if !self.in_ntt_domain {
            return;
        }
        for (ch, channel) in self.channels.iter_mut().enumerate() {
            self.basis.ntt_table(ch).inverse(channel);
        }
        self.in_ntt_domain = false;
    }

    /// Returns a coefficient-domain copy, leaving `self` untouched.
    pub fn coeff_domain_copy(&self) -> Self {
        let mut copy = self.clone();
        copy.to_coeff_domain();
        copy
    }

    /// Multiplies channel `i` by `scalars[i]`. Works in both domains.
    pub fn mul_scalar_assign(&mut self, scalars: &[u64]) {
        debug_assert_eq!(scalars.len(), self.channels.len());
        for ((channel, &q), &scalar) in
            self.channels.iter_mut().zip(self.basis.moduli()).zip(scalars)
        {
            for c in channel.iter_mut() {
                *c = mul_mod(*c, scalar, q);
            }
        }
    }

    /// Lifts the residues of channel `channel` as integers in `[0, q_channel)`
    /// into every channel of the basis.
    ///
    /// This is one digit of the RNS gadget decomposition used by
    /// relinearization. `self` must be in coefficient domain.
    pub fn decompose_channel(&self, channel: usize) -> Self {
        debug_assert!(!self.in_ntt_domain, "decompose_channel: coefficient domain required");
        let source = &self.channels[channel];
        let mut channels = vec![[0u64; DEGREE]; self.basis.channel_count()];
        for (target, &q) in channels.iter_mut().zip(self.basis.moduli()) {
            for (t, &s) in target.iter_mut().zip(source.iter()) {
                *t = s % q;
            }
        }
        Self::new_unchecked(channels, self.basis.clone(), false)
    }

    /// Largest bit length among the centered coefficients.
    pub fn max_coeff_bits(&self) -> u32 {
        let coeff = self.coeff_domain_copy();
        let mut residues = vec![0u64; self.basis.channel_count()];
        let mut max_bits = 0;
        for i in 0..DEGREE {
            for (r, channel) in residues.iter_mut().zip(&coeff.channels) {
                *r = channel[i];
            }
            max_bits = max_bits.max(self.basis.reconstruct(&residues).bits());
        }
        max_bits
    }

    fn pointwise_mul_assign(&mut self, rhs: &Self) {
        debug_assert!(self.in_ntt_domain && rhs.in_ntt_domain);
        for ((channel, rhs_channel), &q) in self
            .channels
            .iter_mut()
            .zip(&rhs.channels)
            .zip(self.basis.moduli())
        {
            for (a, &b) in channel.iter_mut().zip(rhs_channel.iter()) {
                *a = mul_mod(*a, b, q);
            }
        }
    }

    /// Brings `rhs` into `self`'s domain, cloning only when they differ.
    fn zip_channels_in_domain<F>(&mut self, rhs: &Self, mut op: F)
    where
        F: FnMut(u64, u64, u64) -> u64,
    {
        debug_assert_eq!(
            self.basis.moduli(),
            rhs.basis.moduli(),
            "basis mismatch"
        );
        let converted;
        let rhs = if rhs.in_ntt_domain == self.in_ntt_domain {
            rhs
        } else {
            let mut copy = rhs.clone();
            if self.in_ntt_domain {
                copy.to_ntt_domain();
            } else {
                copy.to_coeff_domain();
            }
            converted = copy;
            &converted
        };
        for ((channel, rhs_channel), &q) in self
            .channels
            .iter_mut()
            .zip(&rhs.channels)
            .zip(self.basis.moduli())
        {
            for (a, &b) in channel.iter_mut().zip(rhs_channel.iter()) {
                *a = op(*a, b, q);
            }
        }
    }
}

// ─── Arithmetic ───────────────────────────────────────────────────────────────

impl<const DEGREE: usize> AddAssign<&RnsPoly<DEGREE>> for RnsPoly<DEGREE> {
    /// Coefficient-wise addition modulo each `q_i`, in `self`'s domain.
    fn add_assign(&mut self, rhs: &RnsPoly<DEGREE>) {
        self.zip_channels_in_domain(rhs, add_mod);
    }
}

impl<const DEGREE: usize> SubAssign<&RnsPoly<DEGREE>> for RnsPoly<DEGREE> {
    fn sub_assign(&mut self, rhs: &RnsPoly<DEGREE>) {
        self.zip_channels_in_domain(rhs, sub_mod);
    }
}

impl<const DEGREE: usize> MulAssign<&RnsPoly<DEGREE>> for RnsPoly<DEGREE> {
    /// Negacyclic product in `Z_Q[X]/(X^N + 1)` through the NTT.
    ///
    /// The result stays in the domain `self` was in. Keeping long-lived
    /// operands (keys) in NTT domain avoids re-transforming them.
    fn mul_assign(&mut self, rhs: &RnsPoly<DEGREE>) {
        debug_assert_eq!(self.basis.moduli(), rhs.basis.moduli(), "basis mismatch");
        let was_ntt = self.in_ntt_domain;
        self.to_ntt_domain();
        if rhs.in_ntt_domain {
            self.pointwise_mul_assign(rhs);
        } else {
            let mut rhs_ntt = rhs.clone();
            rhs_ntt.to_ntt_domain();
            self.pointwise_mul_assign(&rhs_ntt);
        }
        if !was_ntt {
            self.to_coeff_domain();
        }
    }
}

impl<const DEGREE: usize> Neg for RnsPoly<DEGREE> {
    type Output = Self;

    /// Coefficient-wise negation modulo each `q_i`. Works in both domains.
    fn neg(mut self) -> Self {
        for (channel, &q) in self.channels.iter_mut().zip(self.basis.moduli()) {
            for c in channel.iter_mut() {
                *c = neg_mod(*c, q);
            }
        }
        self
    }
}

// ─── PolyRing trait ───────────────────────────────────────────────────────────

impl<const DEGREE: usize> PolyRing<DEGREE> for RnsPoly<DEGREE> {
    type Context = Arc<RnsBasis<DEGREE>>;

    fn zero(context: &Self::Context) -> Self {
        Self::zero(context.clone())
    }

    fn from_coeffs(coeffs: &[i64], context: &Self::Context) -> Self {
        Self::from_coeffs(coeffs, context.clone())
    }

    /// CRT-reconstructs each coefficient, centered in `(-Q/2, Q/2]`.
    ///
    /// Coefficients whose magnitude does not fit an `i64` saturate to
    /// `i64::MIN` / `i64::MAX`; use [`RnsBasis::reconstruct`] for exact values.
    fn to_coeffs(&self) -> [i64; DEGREE] {
        let coeff = self.coeff_domain_copy();
        let mut result = [0i64; DEGREE];
        let mut residues = vec![0u64; self.basis.channel_count()];
        for (i, out) in result.iter_mut().enumerate() {
            for (r, channel) in residues.iter_mut().zip(&coeff.channels) {
                *r = channel[i];
            }
            let value = self.basis.reconstruct(&residues);
            *out = value.to_i64().unwrap_or(if value.negative {
                i64::MIN
            } else {
                i64::MAX
            });
        }
        result
    }

    fn context(&self) -> &Self::Context {
        &self.basis
    }
}

// ─── PolySampler trait ────────────────────────────────────────────────────────

impl<const DEGREE: usize> PolySampler<DEGREE> for RnsPoly<DEGREE> {
    /// Samples with coefficients uniform in `[0, q_i)` per channel.
    fn sample_uniform<R: Rng + ?Sized>(context: &Self::Context, rng: &mut R) -> Self {
        let channels = context
            .moduli()
            .iter()
            .map(|&q| uniform_coefficients::<DEGREE, _>(q, rng))
            .collect();
        Self::new_unchecked(channels, context.clone(), false)
    }

    /// Samples noise from a rounded `N(0, std_dev²)`, CRT-encoded per channel.
    fn sample_gaussian<R: Rng + ?Sized>(
        std_dev: f64,
        context: &Self::Context,
        rng: &mut R,
    ) -> Self {
        let noise = gaussian_coefficients::<DEGREE, _>(std_dev, rng);
        Self::from_coeffs(&noise, context.clone())
    }

    /// Samples a ternary polynomial with exactly `hamming_weight` non-zero coefficients.
    fn sample_tribits<R: Rng + ?Sized>(
        hamming_weight: usize,
        context: &Self::Context,
        rng: &mut R,
    ) -> Self {
        let ternary = ternary_coefficients::<DEGREE, _>(hamming_weight, rng);
        Self::from_coeffs(&ternary, context.clone())
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn basis_17_97() -> Arc<RnsBasis<8>> {
        Arc::new(RnsBasis::new(vec![17, 97]).unwrap())
    }

    // ── Construction ──────────────────────────────────────────────────────────

    #[test]
    fn zero_poly_is_all_zeros() {
        let poly = RnsPoly::<8>::zero(basis_17_97());
        assert!(poly.channels().iter().all(|ch| ch.iter().all(|&c| c == 0)));
        assert!(!poly.is_ntt_domain());
    }

    #[test]
    fn from_coeffs_reduces_correctly() {
        let poly = RnsPoly::<8>::from_coeffs(&[-1, 2, -3, 4], basis_17_97());
        assert_eq!(poly.channels()[0][..4], [16, 2, 14, 4]);
        assert_eq!(poly.channels()[1][0], 96);
        assert_eq!(poly.channels()[1][4], 0);
    }

    #[test]
    fn from_channels_rejects_unreduced_coefficient() {
        let bad = vec![[17u64; 8], [0u64; 8]];
        assert!(matches!(
            RnsPoly::from_channels(bad, basis_17_97(), false),
            Err(RnsNttError::NonReducedCoefficient { coefficient: 17, modulus: 17 })
        ));
    }

    #[test]
    fn from_channels_rejects_wrong_channel_count() {
        assert!(matches!(
            RnsPoly::from_channels(vec![[0u64; 8]], basis_17_97(), false),
            Err(RnsNttError::ChannelCountMismatch { expected: 2, actual: 1 })
        ));
    }

    // ── Domains ───────────────────────────────────────────────────────────────

    #[test]
    fn ntt_roundtrip_preserves_coefficients() {
        let mut poly =
            RnsPoly::<8>::from_coeffs(&[1, -2, 3, 4, -5, 6, 7, -8], basis_17_97());
        let original = poly.channels().to_vec();
        poly.to_ntt_domain();
        assert!(poly.is_ntt_domain());
        poly.to_coeff_domain();
        assert_eq!(poly.channels(), original.as_slice());
    }

    #[test]
    fn add_assign_converts_mismatched_domain() {
        let basis = basis_17_97();
        let mut a = RnsPoly::<8>::from_coeffs(&[1, 2, 3], basis.clone());
        let mut b = RnsPoly::<8>::from_coeffs(&[3, 2, 1], basis);
        b.to_ntt_domain();
        a += &b;
        assert!(!a.is_ntt_domain());
        assert_eq!(a.to_coeffs()[..4], [4, 4, 4, 0]);
    }

    // ── Arithmetic ────────────────────────────────────────────────────────────

    #[test]
    fn sub_assign_and_neg_agree() {
        let basis = basis_17_97();
        let a = RnsPoly::<8>::from_coeffs(&[5, -3], basis.clone());
        let mut zero = RnsPoly::<8>::zero(basis);
        zero -= &a;
        assert_eq!(zero.channels(), (-a).channels());
    }

    #[test]
    fn mul_assign_small_product() {
        // (1 + x) * (1 + x) = 1 + 2x + x^2
        let basis = basis_17_97();
        let mut a = RnsPoly::<8>::from_coeffs(&[1, 1], basis.clone());
        let b = RnsPoly::<8>::from_coeffs(&[1, 1], basis);
        a *= &b;
        assert!(!a.is_ntt_domain());
        assert_eq!(a.to_coeffs(), [1, 2, 1, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn mul_assign_wraps_around_quotient() {
        // x^7 * x = x^8 = -1
        let basis = basis_17_97();
        let mut a = RnsPoly::<8>::from_coeffs(&[0, 0, 0, 0, 0, 0, 0, 1], basis.clone());
        let b = RnsPoly::<8>::from_coeffs(&[0, 1], basis);
        a *= &b;
        assert_eq!(a.to_coeffs(), [-1, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn mul_assign_keeps_ntt_domain_of_lhs() {
        let basis = basis_17_97();
        let mut a = RnsPoly::<8>::from_coeffs(&[2], basis.clone());
        a.to_ntt_domain();
        let b = RnsPoly::<8>::from_coeffs(&[0, 3], basis);
        a *= &b;
        assert!(a.is_ntt_domain());
        assert_eq!(a.to_coeffs(), [0, 6, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn mul_scalar_assign_scales_each_channel() {
        let mut poly = RnsPoly::<8>::from_coeffs(&[3, 1], basis_17_97());
        poly.mul_scalar_assign(&[2, 5]);
        assert_eq!(poly.channels()[0][..2], [6, 2]);
        assert_eq!(poly.channels()[1][..2], [15, 5]);
    }

    #[test]
    fn decompose_channel_recombines_to_original() {
        // For Q = 17 * 97, g_0 = 97 * (97^-1 mod 17), g_1 = 17 * (17^-1 mod 97).
        let basis = basis_17_97();
        let poly = RnsPoly::<8>::from_coeffs(&[-500, 700, 3], basis.clone());
        let mut recombined = RnsPoly::<8>::zero(basis.clone());
        for (i, g) in [[1u64, 0], [0, 1]].iter().enumerate() {
            // g_i is the i-th CRT unit vector in residue form.
            let mut digit = poly.decompose_channel(i);
            digit.mul_scalar_assign(g);
            recombined += &digit;
        }
        assert_eq!(recombined.to_coeffs(), poly.to_coeffs());
    }

    #[test]
    fn max_coeff_bits_tracks_largest_coefficient() {
        let poly = RnsPoly::<8>::from_coeffs(&[3, -200, 7], basis_17_97());
        assert_eq!(poly.max_coeff_bits(), 8);
    }

    // ── Sampling ──────────────────────────────────────────────────────────────

    #[test]
    fn sample_uniform_stays_in_range() {
        let basis = basis_17_97();
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let poly = RnsPoly::<8>::sample_uniform(&basis, &mut rng);
        for (channel, &q) in poly.channels().iter().zip(basis.moduli()) {
            assert!(channel.iter().all(|&c| c < q));
        }
    }

    #[test]
    fn sample_tribits_has_correct_hamming_weight() {
        let basis = basis_17_97();
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let poly = RnsPoly::<8>::sample_tribits(3, &basis, &mut rng);
        let non_zero = poly.channels()[0].iter().filter(|&&c| c != 0).count();
        assert_eq!(non_zero, 3);
    }
}
