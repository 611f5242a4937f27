pub mod public_key;
pub mod relin_key;
pub mod secret_key;

pub use public_key::{PublicKey, PublicKeyError, PublicKeyParams};
pub use relin_key::{RelinearizationKey, RelinearizationKeyError, RelinearizationKeyParams};
pub use secret_key::{SecretKey, SecretKeyError, SecretKeyParams};
