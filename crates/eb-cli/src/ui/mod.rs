//! Terminal output for `eb`
//!
//! - [`theme`] - Colors and icons
//! - [`output`] - Step progress and messages, and the pipeline's [`Reporter`]
//!   implementation
//! - [`table`] - Tables for `eb list`
//!
//! [`Reporter`]: eb_core::Reporter

pub mod output;
pub mod table;
pub mod theme;

pub use output::Output;
pub use theme::Theme;
