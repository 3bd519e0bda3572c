//! Generic recipes the package easyblocks are built on.

pub mod binary;
pub mod configure_make;
pub mod packed_binary;

pub use binary::Binary;
pub use configure_make::ConfigureMake;
pub use packed_binary::PackedBinary;
