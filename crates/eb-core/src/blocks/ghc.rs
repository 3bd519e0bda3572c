//! Glasgow Haskell Compiler

use eb_schema::{PathSpec, SanityPaths};

use crate::context::BuildContext;
use crate::easyblock::Easyblock;
use crate::error::Result;
use crate::generic::ConfigureMake;
use crate::module::ModuleGuesses;
use crate::run::CommandRunner;

/// Releases before this ship as binary distributions with nothing to build.
const FIRST_SOURCE_RELEASE: &str = "7.0";

/// Installs GHC with configure/make, skipping `make` for binary releases.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ghc {
    inner: ConfigureMake,
}

impl Ghc {
    /// Whether this version needs the build step.
    pub fn needs_build(ctx: &BuildContext) -> bool {
        ctx.version.loose_cmp(FIRST_SOURCE_RELEASE).is_ge()
    }
}

impl Easyblock for Ghc {
    fn name(&self) -> &'static str {
        "GHC"
    }

    fn configure_step(&self, ctx: &BuildContext, runner: &dyn CommandRunner) -> Result<()> {
        self.inner.configure_step(ctx, runner)
    }

    fn build_step(&self, ctx: &BuildContext, runner: &dyn CommandRunner) -> Result<()> {
        if Self::needs_build(ctx) {
            self.inner.build_step(ctx, runner)
        } else {
            tracing::info!(
                "GHC {} is a binary distribution, skipping build",
                ctx.version
            );
            Ok(())
        }
    }

    fn install_step(&self, ctx: &BuildContext, runner: &dyn CommandRunner) -> Result<()> {
        self.inner.install_step(ctx, runner)
    }

    fn sanity_check_paths(&self, _ctx: &BuildContext) -> Result<Option<SanityPaths>> {
        let files = ["ghc", "ghci", "ghc-pkg", "runghc"]
            .iter()
            .map(|bin| PathSpec::Single(format!("bin/{bin}")));
        Ok(Some(SanityPaths::new(files, ["lib"])))
    }

    fn module_req_guess(&self, ctx: &BuildContext) -> Result<ModuleGuesses> {
        self.inner.module_req_guess(ctx)
    }

    fn install_command(&self, ctx: &BuildContext) -> Result<Option<String>> {
        self.inner.install_command(ctx)
    }
}
