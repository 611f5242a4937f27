use tracing::{Level, debug, enabled, info, instrument, warn};

use super::codec::{decode_scalar, encode_broadcast, to_decimal};
use super::coefficients::{CoefficientSet, derive_coefficients};
use super::config::{SELF_TEST_TOLERANCE, SigmoidConfig};
use super::context::SigmoidContext;
use super::errors::{SigmoidError, SigmoidResult};
use crate::crypto::Ciphertext;
use crate::math::center;

/// Inputs with `|x|` above this lose accuracy to the truncated series.
pub const ACCURATE_INPUT_BOUND: i64 = 2;

/// Result of one end-to-end evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SigmoidOutput {
    /// Decrypted slot value in `Z_t`.
    pub integer: u64,
    /// Fixed-point decoding of `integer`.
    pub decimal: f64,
}

/// Homomorphic evaluation of the degree-7 sigmoid series.
pub struct SigmoidEvaluator<const DEGREE: usize> {
    context: SigmoidContext<DEGREE>,
    coefficients: CoefficientSet<DEGREE>,
}

impl<const DEGREE: usize> SigmoidEvaluator<DEGREE> {
    pub fn new(config: &SigmoidConfig) -> SigmoidResult<Self> {
        Self::with_context(SigmoidContext::initialize(config)?)
    }

    pub fn with_context(context: SigmoidContext<DEGREE>) -> SigmoidResult<Self> {
        let coefficients = derive_coefficients(context.encoder())?;
        Ok(Self {
            context,
            coefficients,
        })
    }

    pub fn context(&self) -> &SigmoidContext<DEGREE> {
        &self.context
    }

    pub fn coefficients(&self) -> &CoefficientSet<DEGREE> {
        &self.coefficients
    }

    /// Broadcast-encodes `value mod t` and encrypts it.
    pub fn encrypt_scalar(&self, value: u64) -> SigmoidResult<Ciphertext<DEGREE>> {
        let plaintext = encode_broadcast(self.context.encoder(), value)?;
        let mut rng = self.context.rng();
        Ok(self.context.encryptor().encrypt(&plaintext, &mut *rng))
    }

    /// Evaluates `1/2 + x/4 - x³/48 + x⁵/480 - 17x⁷/80640` on `x`.
    ///
    /// Powers are built from unscaled ciphertexts (`x³ = x²·x`,
    /// `x⁵ = x³·x²`, `x⁷ = x⁵·x²`) for a depth of 4, every product is
    /// relinearized, and constants are applied to copies.
    #[instrument(skip_all, fields(size = x.size()))]
    pub fn evaluate_sigmoid(&self, x: &Ciphertext<DEGREE>) -> SigmoidResult<Ciphertext<DEGREE>> {
        let ev = self.context.evaluator();
        let rlk = self.context.relin_key();
        let c = &self.coefficients;

        let linear = ev.relinearize(&ev.multiply_plain(x, &c.quarter), rlk)?;
        self.trace_stage("linear", &linear);

        let x2 = ev.relinearize(&ev.square(x)?, rlk)?;
        self.trace_stage("x^2", &x2);

        let x3 = ev.relinearize(&ev.multiply(&x2, x)?, rlk)?;
        let x3_scaled = ev.multiply_plain(&x3, &c.neg_1_48);
        self.trace_stage("x^3", &x3_scaled);

        let x5 = ev.relinearize(&ev.multiply(&x3, &x2)?, rlk)?;
        let x5_scaled = ev.multiply_plain(&x5, &c.pos_1_480);
        self.trace_stage("x^5", &x5_scaled);

        let x7 = ev.relinearize(&ev.multiply(&x5, &x2)?, rlk)?;
        let x7_scaled = ev.multiply_plain(&x7, &c.neg_17_80640);
        self.trace_stage("x^7", &x7_scaled);

        let mut result = ev.add_plain(&linear, &c.half)?;
        result = ev.add(&result, &x3_scaled);
        result = ev.add(&result, &x5_scaled);
        result = ev.add(&result, &x7_scaled);
        self.trace_stage("sum", &result);
        Ok(result)
    }

    /// Decrypts and returns slot 0.
    pub fn decrypt_scalar(&self, ciphertext: &Ciphertext<DEGREE>) -> SigmoidResult<u64> {
        let plaintext = self.context.decryptor().decrypt(ciphertext)?;
        Ok(decode_scalar(self.context.encoder(), &plaintext))
    }

    /// Evaluates at `x = 0` and checks the result decodes to 0.5.
    ///
    /// Catches parameter sets whose noise budget runs out before depth 4,
    /// which otherwise decrypt to plausible-looking garbage.
    pub fn self_test(&self) -> SigmoidResult<f64> {
        let output = self.run(0)?;
        if (output.decimal - 0.5).abs() > SELF_TEST_TOLERANCE {
            return Err(SigmoidError::SelfTestFailed {
                decimal: output.decimal,
                tolerance: SELF_TEST_TOLERANCE,
            });
        }
        debug!(decimal = output.decimal, "self-test passed");
        Ok(output.decimal)
    }

    /// Encrypts `input`, evaluates the series, decrypts and decodes.
    #[instrument(skip(self))]
    pub fn run(&self, input: u64) -> SigmoidResult<SigmoidOutput> {
        let t = self.context.plain_modulus();
        let signed = center(input % t, t);
        if signed.abs() > ACCURATE_INPUT_BOUND {
            warn!(
                input = signed,
                bound = ACCURATE_INPUT_BOUND,
                "input outside the accurate range of the series"
            );
        }

        let encrypted = self.encrypt_scalar(input)?;
        let evaluated = self.evaluate_sigmoid(&encrypted)?;
        let integer = self.decrypt_scalar(&evaluated)?;
        let decimal = to_decimal(integer, t);

        info!(integer, decimal, "sigmoid evaluated");
        Ok(SigmoidOutput { integer, decimal })
    }

    fn trace_stage(&self, stage: &str, ciphertext: &Ciphertext<DEGREE>) {
        if !enabled!(Level::DEBUG) {
            return;
        }
        match self.context.decryptor().noise_budget_bits(ciphertext) {
            Ok(budget) => debug!(stage, size = ciphertext.size(), budget, "stage done"),
            Err(err) => debug!(stage, %err, "noise budget unavailable"),
        }
    }
}
