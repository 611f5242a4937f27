pub mod rns_ntt;

pub use rns_ntt::{BasisExtender, RnsBasis, RnsPoly};
