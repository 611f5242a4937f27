use std::sync::Arc;

use tracing::debug;

use super::{
    basis::{CenteredInt, RnsBasis, WIDE_BITS, WideUint, div_word},
    errors::{RnsNttError, RnsNttResult},
    poly::RnsPoly,
};
use crate::math::bit_length;

/// Moves polynomials between the ciphertext basis `Q` and the extended basis
/// `Q·P` used for exact tensoring, and performs the BFV rescale
/// `x ↦ round(t·x / Q)`.
///
/// Every conversion goes through exact CRT reconstruction, so no
/// approximation error is introduced beyond the final rounding.
#[derive(Debug, Clone)]
pub struct BasisExtender<const DEGREE: usize> {
    source: Arc<RnsBasis<DEGREE>>,
    extended: Arc<RnsBasis<DEGREE>>,
    plain_modulus: u64,
    half_source: WideUint,
}

impl<const DEGREE: usize> BasisExtender<DEGREE> {
    pub fn new(
        source: Arc<RnsBasis<DEGREE>>,
        auxiliary_moduli: &[u64],
        plain_modulus: u64,
    ) -> RnsNttResult<Self> {
        let extended = source.concat(auxiliary_moduli)?;

        // t·x must fit for every x reconstructed over Q·P.
        let bits = extended
            .moduli()
            .iter()
            .map(|&m| bit_length(m))
            .sum::<u32>()
            + bit_length(plain_modulus);
        if bits >= WIDE_BITS {
            return Err(RnsNttError::BasisTooWide {
                bits,
                capacity: WIDE_BITS,
            });
        }

        debug!(
            source_channels = source.channel_count(),
            extended_channels = extended.channel_count(),
            "basis extender ready"
        );

        let half_source = source.product().wrapping_shr(1);
        Ok(Self {
            source,
            extended: Arc::new(extended),
            plain_modulus,
            half_source,
        })
    }

    pub fn source(&self) -> &Arc<RnsBasis<DEGREE>> {
        &self.source
    }

    pub fn extended(&self) -> &Arc<RnsBasis<DEGREE>> {
        &self.extended
    }

    /// Re-encodes a polynomial over `Q` into `Q·P`, keeping each coefficient's
    /// centered representative. The result is in coefficient domain.
    pub fn lift(&self, poly: &RnsPoly<DEGREE>) -> RnsPoly<DEGREE> {
        debug_assert_eq!(poly.basis().moduli(), self.source.moduli());
        let coeff = poly.coeff_domain_copy();
        let mut channels = vec![[0u64; DEGREE]; self.extended.channel_count()];
        let mut residues = vec![0u64; self.source.channel_count()];
        for i in 0..DEGREE {
            gather(&coeff, i, &mut residues);
            let value = self.source.reconstruct(&residues);
            for (channel, &m) in channels.iter_mut().zip(self.extended.moduli()) {
                channel[i] = value.residue(m);
            }
        }
        RnsPoly::new_unchecked(channels, self.extended.clone(), false)
    }

    /// Maps a polynomial over `Q·P` to `round(t·x / Q)` over `Q`.
    pub fn scale_down(&self, poly: &RnsPoly<DEGREE>) -> RnsPoly<DEGREE> {
        debug_assert_eq!(poly.basis().moduli(), self.extended.moduli());
        let coeff = poly.coeff_domain_copy();
        let mut channels = vec![[0u64; DEGREE]; self.source.channel_count()];
        let mut residues = vec![0u64; self.extended.channel_count()];
        for i in 0..DEGREE {
            gather(&coeff, i, &mut residues);
            let value = self.scale_round(self.extended.reconstruct(&residues));
            for (channel, &m) in channels.iter_mut().zip(self.source.moduli()) {
                channel[i] = value.residue(m);
            }
        }
        RnsPoly::new_unchecked(channels, self.source.clone(), false)
    }

    /// Maps a polynomial over `Q` to `round(t·x / Q) mod t`.
    pub fn scale_to_plain(&self, poly: &RnsPoly<DEGREE>) -> [u64; DEGREE] {
        debug_assert_eq!(poly.basis().moduli(), self.source.moduli());
        let coeff = poly.coeff_domain_copy();
        let mut residues = vec![0u64; self.source.channel_count()];
        let mut out = [0u64; DEGREE];
        for (i, slot) in out.iter_mut().enumerate() {
            gather(&coeff, i, &mut residues);
            *slot = self
                .scale_round(self.source.reconstruct(&residues))
                .residue(self.plain_modulus);
        }
        out
    }

    pub fn plain_modulus(&self) -> u64 {
        self.plain_modulus
    }

    // round(t·|x| / Q) with the sign of x; ties round away from zero.
    fn scale_round(&self, value: CenteredInt) -> CenteredInt {
        let mut scaled = value
            .magnitude
            .wrapping_mul(&WideUint::from_u64(self.plain_modulus))
            .wrapping_add(&self.half_source);
        // Nested floor divisions by each q_i equal one floor division by Q.
        for &q in self.source.moduli() {
            scaled = div_word(&scaled, q);
        }
        CenteredInt {
            negative: value.negative && scaled != WideUint::ZERO,
            magnitude: scaled,
        }
    }
}

fn gather<const DEGREE: usize>(poly: &RnsPoly<DEGREE>, index: usize, out: &mut [u64]) {
    for (r, channel) in out.iter_mut().zip(poly.channels()) {
        *r = channel[index];
    }
}
