//! Encrypted evaluation of a degree-7 Taylor approximation of the logistic
//! function over BFV.
//!
//! The valid decimal range is bounded: see [`codec::decimal_window`]. The
//! series itself is only accurate for `|x| <= 2`.

pub mod codec;
pub mod coefficients;
pub mod config;
pub mod context;
pub mod errors;
pub mod evaluator;

pub use codec::{DENOMINATOR, decimal_window, decode_scalar, encode_broadcast, to_decimal};
pub use coefficients::{
    CoefficientSet, SigmoidScalars, derive_coefficients, evaluate_clear, modular_inverse,
};
pub use config::{SIGMOID_DEPTH, SigmoidConfig};
pub use context::SigmoidContext;
pub use errors::{SigmoidError, SigmoidResult};
pub use evaluator::{SigmoidEvaluator, SigmoidOutput};

/// Ring degree of the reference configuration.
pub const RING_DEGREE: usize = 8192;
