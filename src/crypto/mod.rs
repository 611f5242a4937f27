//! Leveled BFV scheme over the RNS-NTT ring backend.
//!
//! The engine owns parameters and precomputation; encryption, decryption
//! and evaluation are separate handles bound to it.

pub mod builder;
pub mod encoder;
pub mod engine;
pub mod errors;
pub mod operations;
pub mod params;
pub mod types;

pub use builder::BfvEngineBuilder;
pub use encoder::BatchEncoder;
pub use engine::BfvEngine;
pub use errors::{BfvError, BfvResult};
pub use operations::{Decryptor, Encryptor, Evaluator};
pub use params::BfvParams;
pub use types::{Ciphertext, Plaintext};
