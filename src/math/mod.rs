pub mod modular;
pub mod primes;
pub mod sampling;

pub use modular::{
    add_mod, bit_length, center, mod_inverse, mod_pow, mul_mod, neg_mod,
    reduce_signed, sub_mod,
};
pub use primes::{
    batching_prime, generate_primes, get_first_prime_down, is_ntt_friendly_prime,
    is_prime,
};
pub use sampling::{
    gaussian_coefficients, ternary_coefficients, uniform_coefficients,
};
