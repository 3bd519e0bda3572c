//! Subcommand implementations

use std::path::Path;

use anyhow::{Context, Result};
use eb_core::paths::Layout;
use eb_core::{BuildContext, Easyblock, registry};
use eb_schema::EasyConfig;

pub mod install;
pub mod list;
pub mod module;
pub mod sanity;
pub mod show;

/// An easyconfig together with its frozen context and chosen easyblock.
#[derive(Debug)]
pub struct Loaded {
    pub config: EasyConfig,
    pub ctx: BuildContext,
    pub block: Box<dyn Easyblock>,
}

/// Read an easyconfig and resolve everything needed to act on it.
pub fn load(path: &Path, layout: &Layout) -> Result<Loaded> {
    let config = EasyConfig::from_file(path)
        .with_context(|| format!("Failed to load easyconfig {}", path.display()))?;
    let block = registry::resolve(&config)
        .with_context(|| format!("No easyblock for {}", path.display()))?;
    let ctx = BuildContext::from_easyconfig(&config, layout)
        .with_context(|| format!("Invalid easyconfig {}", path.display()))?;
    tracing::debug!(
        "{} -> {} {} with {}",
        path.display(),
        ctx.name,
        ctx.version,
        block.name()
    );
    Ok(Loaded { config, ctx, block })
}
