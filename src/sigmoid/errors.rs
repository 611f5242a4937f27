use thiserror::Error;

use crate::crypto::BfvError;

#[derive(Error, Debug)]
pub enum SigmoidError {
    #[error("Scheme error: {source}")]
    Scheme {
        #[from]
        source: BfvError,
    },

    #[error("{value} has no inverse modulo {modulus}")]
    NotCoprime { value: u64, modulus: u64 },

    #[error("self-test failed: sigmoid(0) decoded to {decimal}, expected 0.5 within {tolerance}")]
    SelfTestFailed { decimal: f64, tolerance: f64 },
}

pub type SigmoidResult<T> = Result<T, SigmoidError>;
