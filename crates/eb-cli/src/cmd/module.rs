//! Module command

use std::path::Path;

use anyhow::{Context, Result};
use eb_core::paths::Layout;
use eb_core::pipeline;

use super::load;

/// Print the module file an install would write, based on what currently
/// exists in the install directory.
pub fn module(easyconfig: &Path, layout: &Layout) -> Result<()> {
    let item = load(easyconfig, layout)?;
    let module = pipeline::module_file(item.block.as_ref(), &item.ctx)
        .context("Failed to generate module file")?;
    print!("{}", module.render());
    Ok(())
}
