//! Install command

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use eb_core::paths::Layout;
use eb_core::{Pipeline, PipelineOptions, ShellRunner};

use super::{Loaded, load, show};
use crate::ui::Output;

/// Install every easyconfig in order, stopping at the first failure.
///
/// All easyconfigs are loaded and resolved before anything is built, so a
/// typo in the last one does not leave the first half installed.
pub fn install(
    easyconfigs: &[PathBuf],
    options: PipelineOptions,
    layout: &Layout,
    dry_run: bool,
    verbose: bool,
) -> Result<()> {
    let loaded = easyconfigs
        .iter()
        .map(|path| load(path, layout))
        .collect::<Result<Vec<_>>>()?;

    let output = Output::new().plain(verbose);

    if dry_run {
        for item in &loaded {
            show::print_plan(&output, item, options)?;
        }
        println!();
        output.info("Dry run: nothing was installed.");
        return Ok(());
    }

    let start = Instant::now();
    for item in &loaded {
        install_one(&output, item, options, layout, verbose)?;
    }
    output.summary(loaded.len(), "installed", start.elapsed().as_secs_f64());
    Ok(())
}

fn install_one(
    output: &Output,
    item: &Loaded,
    options: PipelineOptions,
    layout: &Layout,
    verbose: bool,
) -> Result<()> {
    let ctx = &item.ctx;
    let log = layout.build_log_path(&ctx.name, ctx.version.as_str());
    let runner = ShellRunner::new().with_log(&log).verbose(verbose);

    let report = Pipeline::new(item.block.as_ref(), &runner, output)
        .with_options(options)
        .run(ctx)
        .with_context(|| {
            let mut msg = format!("Failed to install {} {}", ctx.name, ctx.version);
            if let Some(log) = runner.log_path().filter(|l| l.exists()) {
                msg.push_str(&format!(" (build log: {})", log.display()));
            }
            if ctx.builddir.exists() {
                msg.push_str(&format!(" (build dir: {})", ctx.builddir.display()));
            }
            msg
        })?;

    output.success(&format!("Installed to {}", ctx.installdir.display()));
    if let Some(module) = &report.module_file {
        output.info(&format!("Module file {}", module.display()));
    }
    if log.exists() {
        output.info(&format!("Build log {}", log.display()));
    }
    Ok(())
}
