//! The host side of the lifecycle: runs an easyblock's hooks in order.
//!
//! ```text
//! prepare dirs → extract → configure → build → install → post_install
//!              → sanity_check → module → remove build dir
//! ```
//!
//! The first failing step ends the run; later steps (the sanity check in
//! particular) never see a half-installed tree.

use std::path::PathBuf;

use eb_schema::Step;

use crate::context::BuildContext;
use crate::easyblock::Easyblock;
use crate::error::{BuildError, Result};
use crate::module::ModuleFile;
use crate::reporter::Reporter;
use crate::run::CommandRunner;
use crate::sanity;

/// Host switches that are not part of the easyconfig.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    /// Do not run the sanity check.
    pub skip_sanity: bool,
    /// Do not write a module file.
    pub skip_module: bool,
    /// Leave the build directory in place after a successful run.
    pub keep_builddir: bool,
}

/// What a successful run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Steps that ran, in order.
    pub ran: Vec<Step>,
    /// Steps that were skipped.
    pub skipped: Vec<Step>,
    /// Module file written, if any.
    pub module_file: Option<PathBuf>,
}

/// Drives one easyblock through the lifecycle.
pub struct Pipeline<'a> {
    block: &'a dyn Easyblock,
    runner: &'a dyn CommandRunner,
    reporter: &'a dyn Reporter,
    options: PipelineOptions,
}

impl std::fmt::Debug for Pipeline<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("block", &self.block.name())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<'a> Pipeline<'a> {
    /// Pipeline with default options.
    pub fn new(
        block: &'a dyn Easyblock,
        runner: &'a dyn CommandRunner,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            block,
            runner,
            reporter,
            options: PipelineOptions::default(),
        }
    }

    /// Replace the host switches.
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Why `step` will not run, if it will not.
    pub fn skip_reason(&self, ctx: &BuildContext, step: Step) -> Option<&'static str> {
        if ctx.opts.skips(step) {
            return Some("skipped by easyconfig");
        }
        match step {
            Step::SanityCheck if self.options.skip_sanity => Some("--skip-sanity-check"),
            Step::Module if self.options.skip_module => Some("--skip-module"),
            _ => None,
        }
    }

    /// Install the package described by `ctx`.
    ///
    /// # Errors
    ///
    /// Returns the first step's error; nothing after it runs.
    pub fn run(&self, ctx: &BuildContext) -> Result<BuildReport> {
        self.reporter.package_started(&ctx.name, &ctx.version);
        tracing::info!(
            "building {} {} with easyblock {}",
            ctx.name,
            ctx.version,
            self.block.name()
        );

        prepare_dirs(ctx)?;

        let mut report = BuildReport::default();
        for step in Step::ORDER {
            if let Some(reason) = self.skip_reason(ctx, step) {
                tracing::info!("skipping {step} step ({reason})");
                self.reporter.step_skipped(step, reason);
                report.skipped.push(step);
                continue;
            }

            tracing::info!("running {step} step");
            self.reporter.step_started(step);
            if let Err(e) = self.run_step(ctx, step, &mut report) {
                tracing::error!("{step} step failed: {e}");
                self.reporter.step_failed(step, &e.to_string());
                return Err(e);
            }
            self.reporter.step_done(step);
            report.ran.push(step);
        }

        if self.options.keep_builddir {
            tracing::info!("keeping build directory {}", ctx.builddir.display());
        } else if let Err(e) = std::fs::remove_dir_all(&ctx.builddir) {
            tracing::warn!("failed to remove {}: {e}", ctx.builddir.display());
            self.reporter.warning(&format!(
                "could not remove build directory {}",
                ctx.builddir.display()
            ));
        }

        Ok(report)
    }

    fn run_step(&self, ctx: &BuildContext, step: Step, report: &mut BuildReport) -> Result<()> {
        let (block, runner) = (self.block, self.runner);
        match step {
            Step::Extract => block.extract_step(ctx, runner),
            Step::Configure => block.configure_step(ctx, runner),
            Step::Build => block.build_step(ctx, runner),
            Step::Install => block.install_step(ctx, runner),
            Step::PostInstall => block.post_install_step(ctx, runner),
            Step::SanityCheck => sanity_check(block, ctx),
            Step::Module => {
                write_module(block, ctx)?;
                report.module_file = Some(ctx.module_file.clone());
                Ok(())
            }
        }
    }
}

/// Run the sanity check for an existing installation.
///
/// # Errors
///
/// Returns `BuildError::SanityCheck` listing everything missing.
pub fn sanity_check(block: &dyn Easyblock, ctx: &BuildContext) -> Result<()> {
    let from_block = block.sanity_check_paths(ctx)?;
    let paths = sanity::select_paths(ctx.sanity_override.as_ref(), from_block);
    sanity::check_paths(&ctx.installdir, &paths)
}

/// The module file for an existing installation.
///
/// # Errors
///
/// Returns the easyblock's error if it cannot compute its guesses.
pub fn module_file(block: &dyn Easyblock, ctx: &BuildContext) -> Result<ModuleFile> {
    let guesses = block.module_req_guess(ctx)?;
    Ok(ModuleFile::generate(ctx, &guesses))
}

fn write_module(block: &dyn Easyblock, ctx: &BuildContext) -> Result<()> {
    module_file(block, ctx)?.write(&ctx.module_file)
}

/// Start from an empty build directory and an empty install directory.
fn prepare_dirs(ctx: &BuildContext) -> Result<()> {
    for dir in [&ctx.builddir, &ctx.installdir] {
        if dir.exists() {
            tracing::info!("removing existing {}", dir.display());
            std::fs::remove_dir_all(dir)
                .map_err(|e| BuildError::io(format!("Failed to remove {}", dir.display()), e))?;
        }
        std::fs::create_dir_all(dir)
            .map_err(|e| BuildError::io(format!("Failed to create {}", dir.display()), e))?;
    }
    Ok(())
}
