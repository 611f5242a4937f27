use tracing::instrument;

use super::errors::{BfvError, BfvResult};
use super::types::Plaintext;
use crate::rings::NttTable;

/// SIMD batch encoder for `Z_t[X]/(X^N + 1)` with `t ≡ 1 (mod 2N)`.
///
/// Slot `k` of a plaintext is its evaluation at the `k`-th odd power of a
/// primitive `2N`-th root of unity mod `t`, so slot-wise products and sums
/// are ring products and sums. A vector with every slot equal to `v`
/// encodes to the constant polynomial `v`.
#[derive(Debug, Clone)]
pub struct BatchEncoder<const DEGREE: usize> {
    table: NttTable<DEGREE>,
}

impl<const DEGREE: usize> BatchEncoder<DEGREE> {
    pub fn new(plain_modulus: u64) -> BfvResult<Self> {
        let table = NttTable::new(plain_modulus).map_err(|_| {
            BfvError::NonBatchingPlaintextModulus {
                modulus: plain_modulus,
                degree: DEGREE,
            }
        })?;
        Ok(Self { table })
    }

    pub fn plain_modulus(&self) -> u64 {
        self.table.modulus()
    }

    pub fn slot_count(&self) -> usize {
        DEGREE
    }

    /// Encodes exactly `DEGREE` slot values, each reduced modulo `t`.
    #[instrument(skip(self, slots), fields(slots = slots.len()), level = "trace")]
    pub fn encode(&self, slots: &[u64]) -> BfvResult<Plaintext<DEGREE>> {
        if slots.len() != DEGREE {
            return Err(BfvError::SlotCountMismatch {
                expected: DEGREE,
                actual: slots.len(),
            });
        }
        let t = self.plain_modulus();
        let mut coeffs = [0u64; DEGREE];
        for (c, &v) in coeffs.iter_mut().zip(slots) {
            *c = v % t;
        }
        self.table.inverse(&mut coeffs);
        Ok(Plaintext::new(coeffs, t))
    }

    /// Recovers the `DEGREE` slot values of a plaintext.
    pub fn decode(&self, plaintext: &Plaintext<DEGREE>) -> Vec<u64> {
        let mut slots = plaintext.coeffs;
        self.table.forward(&mut slots);
        slots.to_vec()
    }
}
