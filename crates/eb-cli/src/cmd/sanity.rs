//! Sanity-check command

use std::path::Path;

use anyhow::{Context, Result, bail};
use eb_core::paths::Layout;
use eb_core::pipeline;

use super::load;
use crate::ui::Output;

/// Check an existing installation for the files and directories its
/// easyblock (or easyconfig) expects.
pub fn sanity_check(easyconfig: &Path, layout: &Layout) -> Result<()> {
    let item = load(easyconfig, layout)?;
    let ctx = &item.ctx;
    if !ctx.installdir.is_dir() {
        bail!(
            "{} {} is not installed ({} does not exist)",
            ctx.name,
            ctx.version,
            ctx.installdir.display()
        );
    }

    pipeline::sanity_check(item.block.as_ref(), ctx)
        .with_context(|| format!("{} {} failed its sanity check", ctx.name, ctx.version))?;

    Output::new().success(&format!(
        "{} {} passed its sanity check ({})",
        ctx.name,
        ctx.version,
        ctx.installdir.display()
    ));
    Ok(())
}
