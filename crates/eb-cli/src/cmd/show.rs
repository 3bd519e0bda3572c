//! Show command

use std::path::Path;

use anyhow::Result;
use eb_core::paths::Layout;
use eb_core::reporter::NullReporter;
use eb_core::{BuildError, Pipeline, PipelineOptions, ShellRunner};
use eb_schema::Step;

use super::{Loaded, load};
use crate::ui::Output;

/// Show how an easyconfig would be installed.
pub fn show(easyconfig: &Path, layout: &Layout) -> Result<()> {
    let item = load(easyconfig, layout)?;
    print_plan(&Output::new(), &item, PipelineOptions::default())
}

/// Print the resolved plan for one package without touching the filesystem.
pub fn print_plan(output: &Output, item: &Loaded, options: PipelineOptions) -> Result<()> {
    let ctx = &item.ctx;
    let block = item.block.as_ref();

    output.section(&format!("{} {}", ctx.name, ctx.version));
    if !ctx.description.is_empty() {
        output.field("description", &ctx.description);
    }
    if !item.config.package.homepage.is_empty() {
        output.field("homepage", &item.config.package.homepage);
    }
    output.field("easyblock", block.name());
    output.field("install dir", &ctx.installdir.display().to_string());
    output.field("build dir", &ctx.builddir.display().to_string());
    output.field("module file", &ctx.module_file.display().to_string());
    output.field("parallel", &ctx.parallel.to_string());
    for source in &ctx.sources {
        let mut line = source.display().to_string();
        if !source.exists() {
            line.push_str(" (missing)");
        }
        output.field("source", &line);
    }

    let runner = ShellRunner::new();
    let pipeline = Pipeline::new(block, &runner, &NullReporter).with_options(options);
    let steps: Vec<String> = Step::ORDER
        .iter()
        .map(|&step| match pipeline.skip_reason(ctx, step) {
            Some(reason) => format!("{step} (skipped: {reason})"),
            None => step.to_string(),
        })
        .collect();
    output.field("steps", &steps.join(", "));

    let install = match block.install_command(ctx) {
        Ok(Some(cmd)) => cmd,
        Ok(None) => "built-in (no external command)".to_string(),
        Err(BuildError::InstallerNotFound { pattern }) => {
            format!("found after extraction ({pattern})")
        }
        Err(e) => return Err(e.into()),
    };
    output.field("install cmd", &install);
    Ok(())
}
