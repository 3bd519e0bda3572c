//! Shared types for easyblocks: easyconfig schema, versions and sanity paths.

pub mod easyconfig;
pub mod sanity;
pub mod step;
pub mod types;

// Re-exports
pub use easyconfig::{BuildOptions, ConfigError, EasyConfig, ModuleSpec, PackageInfo, SourceSpec};
pub use sanity::{PathSpec, SanityPaths};
pub use step::Step;
pub use types::*;
