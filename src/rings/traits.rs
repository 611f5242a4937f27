use rand::Rng;
use std::ops::{AddAssign, MulAssign, Neg, SubAssign};

// Core polynomial ring trait - all BFV operations work on this
pub trait PolyRing<const DEGREE: usize>:
    Clone
    + for<'a> AddAssign<&'a Self>
    + for<'a> SubAssign<&'a Self>
    + for<'a> MulAssign<&'a Self>
    + Neg<Output = Self>
{
    type Context;

    fn zero(context: &Self::Context) -> Self;
    fn from_coeffs(coeffs: &[i64], context: &Self::Context) -> Self;
    fn to_coeffs(&self) -> [i64; DEGREE];

    fn context(&self) -> &Self::Context;
}

// Sampling trait - provides common sampling operations for polynomials
pub trait PolySampler<const DEGREE: usize>: PolyRing<DEGREE> {
    fn sample_uniform<R: Rng + ?Sized>(context: &Self::Context, rng: &mut R) -> Self;
    fn sample_gaussian<R: Rng + ?Sized>(
        std_dev: f64,
        context: &Self::Context,
        rng: &mut R,
    ) -> Self;
    fn sample_tribits<R: Rng + ?Sized>(
        hamming_weight: usize,
        context: &Self::Context,
        rng: &mut R,
    ) -> Self;
}
