//! `./configure && make && make install`

use crate::context::BuildContext;
use crate::easyblock::{Easyblock, join_cmd, quote_path};
use crate::error::{BuildError, Result};
use crate::run::CommandRunner;

/// Builds autotools-style source trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigureMake;

impl ConfigureMake {
    /// `<preconfigopts> ./configure --prefix=<installdir> <configopts>`
    pub fn configure_cmd(ctx: &BuildContext) -> String {
        let prefix = format!("--prefix={}", quote_path(&ctx.installdir));
        join_cmd(&[
            &ctx.opts.preconfigopts,
            "./configure",
            &prefix,
            &ctx.opts.configopts,
        ])
    }

    /// `<prebuildopts> make -j <parallel> <buildopts>`
    pub fn build_cmd(ctx: &BuildContext) -> String {
        let jobs = format!("-j {}", ctx.parallel);
        join_cmd(&[&ctx.opts.prebuildopts, "make", &jobs, &ctx.opts.buildopts])
    }

    /// `<preinstallopts> make install <installopts>`, unless overridden.
    pub fn install_cmd(ctx: &BuildContext) -> String {
        let cmd = ctx.install_cmd_override().unwrap_or("make install");
        join_cmd(&[&ctx.opts.preinstallopts, cmd, &ctx.opts.installopts])
    }
}

fn require_make() -> Result<()> {
    which::which("make").map_err(|_| BuildError::MissingTool("make".to_string()))?;
    Ok(())
}

impl Easyblock for ConfigureMake {
    fn name(&self) -> &'static str {
        "ConfigureMake"
    }

    fn configure_step(&self, ctx: &BuildContext, runner: &dyn CommandRunner) -> Result<()> {
        runner.run(&Self::configure_cmd(ctx), &ctx.start_dir())?;
        Ok(())
    }

    fn build_step(&self, ctx: &BuildContext, runner: &dyn CommandRunner) -> Result<()> {
        require_make()?;
        runner.run(&Self::build_cmd(ctx), &ctx.start_dir())?;
        Ok(())
    }

    fn install_step(&self, ctx: &BuildContext, runner: &dyn CommandRunner) -> Result<()> {
        if ctx.install_cmd_override().is_none() {
            require_make()?;
        }
        runner.run(&Self::install_cmd(ctx), &ctx.start_dir())?;
        Ok(())
    }

    fn install_command(&self, ctx: &BuildContext) -> Result<Option<String>> {
        Ok(Some(Self::install_cmd(ctx)))
    }
}
