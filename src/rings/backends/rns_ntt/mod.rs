pub mod basis;
pub mod errors;
pub mod extend;
pub mod ntt;
pub mod poly;

pub use basis::{CenteredInt, RnsBasis, WIDE_BITS, WideUint, div_word, reduce_wide};
pub use errors::{RnsNttError, RnsNttResult};
pub use extend::BasisExtender;
pub use ntt::NttTable;
pub use poly::RnsPoly;
