//! Prime search for the plaintext modulus and the RNS ciphertext bases.
//!
//! Primality uses deterministic Miller-Rabin over `u64`: with the fixed base
//! set below no composite below `3.3 * 10^24` survives, which covers every
//! `u64`. All searches walk the arithmetic progression `p ≡ 1 (mod 2n)` so
//! every returned prime supports a negacyclic NTT of length `n` (and therefore
//! batching when used as the plaintext modulus).

use super::modular::{mod_pow, mul_mod};

// Source: https://miller-rabin.appspot.com/
const MILLER_RABIN_BASES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// Returns `(odd_part, power_of_two)` such that `n = odd_part * 2^power_of_two`.
fn decompose(n: u64) -> (u64, u32) {
    debug_assert!(n > 0);
    let r = n.trailing_zeros();
    (n >> r, r)
}

/// Returns `true` if `n` is prime.
pub fn is_prime(n: u64) -> bool {
    match n {
        0 | 1 => return false,
        2 | 3 => return true,
        _ if n & 1 == 0 => return false,
        _ => {}
    }

    let (d, r) = decompose(n - 1);
    'bases: for &a in MILLER_RABIN_BASES.iter() {
        if a >= n {
            continue;
        }
        let mut x = mod_pow(a, d, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 1..r {
            x = mul_mod(x, x, n);
            if x == n - 1 {
                continue 'bases;
            }
        }
        return false;
    }
    true
}

/// Returns `true` when `p` is prime and `p ≡ 1 (mod 2n)`.
///
/// Such a `p` has a primitive `2n`-th root of unity, which the negacyclic NTT
/// over `X^n + 1` needs.
#[inline]
pub fn is_ntt_friendly_prime(p: u64, n: u64) -> bool {
    match n.checked_mul(2) {
        Some(step) if n > 0 => is_prime(p) && p % step == 1,
        _ => false,
    }
}

/// Returns the largest `x <= value` such that `x % modulus == 1`, if any.
fn snap_down_to_congruence(value: u64, modulus: u64) -> Option<u64> {
    let remainder = value % modulus;
    let delta = (remainder + modulus - 1) % modulus;
    value.checked_sub(delta)
}

/// Returns the largest NTT-friendly prime `p < bound` for degree `n`.
///
/// Returns `None` if no such prime exists below `bound`.
pub fn get_first_prime_down(bound: u64, n: u64) -> Option<u64> {
    let step = n.checked_mul(2)?;
    if n == 0 || bound <= 2 {
        return None;
    }

    let mut candidate = snap_down_to_congruence(bound - 1, step)?;
    loop {
        if candidate <= 2 {
            return None;
        }
        if is_prime(candidate) {
            return Some(candidate);
        }
        candidate = candidate.checked_sub(step)?;
    }
}

/// Returns the largest batching-friendly prime with exactly `bit_size` bits.
///
/// This is the plaintext-modulus choice for BFV batching: the prime must be
/// `≡ 1 (mod 2n)` so `Z_t[X]/(X^n + 1)` splits into `n` slots.
pub fn batching_prime(bit_size: u32, n: u64) -> Option<u64> {
    if !(2..=62).contains(&bit_size) {
        return None;
    }
    let prime = get_first_prime_down(1u64 << bit_size, n)?;
    (prime >= 1u64 << (bit_size - 1)).then_some(prime)
}

/// Generates `count` distinct NTT-friendly primes of exactly `bit_size` bits,
/// skipping every value listed in `exclude`.
///
/// The search walks downward from `2^bit_size`, so repeated calls with the
/// same arguments return the same primes.
pub fn generate_primes(
    bit_size: u32,
    count: usize,
    degree: u64,
    exclude: &[u64],
) -> Option<Vec<u64>> {
    if !(2..=62).contains(&bit_size) {
        return None;
    }
    let lower_bound = 1u64 << (bit_size - 1);
    let mut primes = Vec::with_capacity(count);
    let mut cursor = 1u64 << bit_size;

    while primes.len() < count {
        let prime = get_first_prime_down(cursor, degree)?;
        if prime < lower_bound {
            return None;
        }
        if !exclude.contains(&prime) {
            primes.push(prime);
        }
        cursor = prime;
    }
    Some(primes)
}
