use std::sync::{Arc, Mutex, MutexGuard};

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::{info, instrument};

use super::config::SigmoidConfig;
use super::errors::SigmoidResult;
use crate::crypto::{BatchEncoder, BfvEngine, Decryptor, Encryptor, Evaluator};
use crate::keys::RelinearizationKey;

/// Parameters, keys and operator handles, built once and shared read-only.
///
/// The secret key lives only inside the decryptor; nothing here hands it
/// out. The RNG is behind a mutex so encryption can run through `&self`.
pub struct SigmoidContext<const DEGREE: usize> {
    engine: Arc<BfvEngine<DEGREE>>,
    encryptor: Encryptor<DEGREE>,
    decryptor: Decryptor<DEGREE>,
    evaluator: Evaluator<DEGREE>,
    relin_key: RelinearizationKey<DEGREE>,
    rng: Mutex<ChaCha20Rng>,
}

impl<const DEGREE: usize> SigmoidContext<DEGREE> {
    /// Builds parameters, then keys, then the operator handles.
    #[instrument(skip_all, fields(degree = DEGREE, seeded = config.seed.is_some()))]
    pub fn initialize(config: &SigmoidConfig) -> SigmoidResult<Self> {
        let engine = Arc::new(config.engine_builder::<DEGREE>().build()?);
        let mut rng = match config.seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_os_rng(),
        };

        let secret_key = engine.generate_secret_key(&mut rng)?;
        let public_key = engine.generate_public_key(&secret_key, &mut rng)?;
        let relin_key = engine.generate_relinearization_key(&secret_key, &mut rng)?;

        info!(
            plain_modulus = engine.plain_modulus(),
            coeff_modulus_bits = engine.basis().modulus_bits(),
            "sigmoid context initialized"
        );

        Ok(Self {
            encryptor: Encryptor::new(engine.clone(), public_key),
            decryptor: Decryptor::new(engine.clone(), secret_key),
            evaluator: Evaluator::new(engine.clone()),
            engine,
            relin_key,
            rng: Mutex::new(rng),
        })
    }

    pub fn engine(&self) -> &BfvEngine<DEGREE> {
        &self.engine
    }

    pub fn encoder(&self) -> &BatchEncoder<DEGREE> {
        self.engine.encoder()
    }

    pub fn plain_modulus(&self) -> u64 {
        self.engine.plain_modulus()
    }

    pub fn encryptor(&self) -> &Encryptor<DEGREE> {
        &self.encryptor
    }

    pub fn decryptor(&self) -> &Decryptor<DEGREE> {
        &self.decryptor
    }

    pub fn evaluator(&self) -> &Evaluator<DEGREE> {
        &self.evaluator
    }

    pub fn relin_key(&self) -> &RelinearizationKey<DEGREE> {
        &self.relin_key
    }

    pub(crate) fn rng(&self) -> MutexGuard<'_, ChaCha20Rng> {
        // A panic while holding the lock leaves the RNG state usable.
        self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
