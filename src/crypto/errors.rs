use thiserror::Error;

use crate::keys::{PublicKeyError, RelinearizationKeyError, SecretKeyError};
use crate::rings::RnsNttError;

#[derive(Error, Debug)]
pub enum BfvError {
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    #[error("ring degree {degree} must be a power of two and at least 16")]
    InvalidDegree { degree: usize },

    #[error("no {bits}-bit batching prime exists for ring degree {degree}")]
    NoBatchingPrime { bits: u32, degree: usize },

    #[error("plaintext modulus {modulus} is not a prime congruent to 1 mod {}", 2 * degree)]
    NonBatchingPlaintextModulus { modulus: u64, degree: usize },

    #[error("could not find {count} distinct {bits}-bit NTT-friendly primes")]
    NotEnoughPrimes { bits: u32, count: usize },

    #[error("coefficient modulus supports an estimated depth of {estimated}, {required} required")]
    InsufficientDepth { estimated: usize, required: usize },

    #[error("ciphertext of size {size} must be relinearized before multiplication")]
    NotRelinearized { size: usize },

    #[error("unsupported ciphertext size {size}")]
    InvalidCiphertextSize { size: usize },

    #[error("slot vector has {actual} entries, expected {expected}")]
    SlotCountMismatch { expected: usize, actual: usize },

    #[error("Ring error: {source}")]
    Ring {
        #[from]
        source: RnsNttError,
    },

    #[error("Secret key error: {source}")]
    SecretKey {
        #[from]
        source: SecretKeyError,
    },

    #[error("Public key error: {source}")]
    PublicKey {
        #[from]
        source: PublicKeyError,
    },

    #[error("Relinearization key error: {source}")]
    RelinearizationKey {
        #[from]
        source: RelinearizationKeyError,
    },
}

pub type BfvResult<T> = Result<T, BfvError>;
