pub mod crypto;
pub mod keys;
pub mod math;
pub mod rings;
pub mod sigmoid;

pub use crypto::{
    BatchEncoder, BfvEngine, BfvEngineBuilder, BfvError, BfvParams, BfvResult, Ciphertext,
    Decryptor, Encryptor, Evaluator, Plaintext,
};
pub use keys::{
    PublicKey, PublicKeyError, PublicKeyParams, RelinearizationKey, RelinearizationKeyError,
    RelinearizationKeyParams, SecretKey, SecretKeyError, SecretKeyParams,
};
pub use rings::{PolyRing, PolySampler, RnsBasis, RnsNttError, RnsPoly};
pub use sigmoid::{
    SigmoidConfig, SigmoidContext, SigmoidError, SigmoidEvaluator, SigmoidOutput,
};
