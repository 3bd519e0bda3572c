//! Package-specific easyblocks.

pub mod cst;
pub mod ghc;
pub mod starccm;

pub use cst::Cst;
pub use ghc::Ghc;
pub use starccm::StarCcm;
