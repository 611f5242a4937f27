pub mod backends;
pub mod traits;

pub use backends::rns_ntt::{
    BasisExtender, CenteredInt, NttTable, RnsBasis, RnsNttError, RnsNttResult, RnsPoly,
    WideUint, div_word, reduce_wide,
};
pub use traits::{PolyRing, PolySampler};
