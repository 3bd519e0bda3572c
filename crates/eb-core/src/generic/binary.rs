//! Prebuilt software: sources are copied, then either an installer runs or
//! the build directory is copied into place.

use std::path::Path;

use crate::context::BuildContext;
use crate::easyblock::{Easyblock, copy_sources, join_cmd};
use crate::error::{BuildError, Result};
use crate::run::CommandRunner;

/// Installs prebuilt binaries or runs a vendor installer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Binary;

impl Binary {
    /// `cmd` wrapped in the easyconfig's `preinstallopts` and `installopts`.
    pub fn wrap_install_cmd(ctx: &BuildContext, cmd: &str) -> String {
        join_cmd(&[&ctx.opts.preinstallopts, cmd, &ctx.opts.installopts])
    }

    /// Run the wrapped `cmd` from the build directory.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::CommandFailed` if the command exits non-zero.
    pub fn run_install_cmd(
        ctx: &BuildContext,
        runner: &dyn CommandRunner,
        cmd: &str,
    ) -> Result<()> {
        runner.run(&Self::wrap_install_cmd(ctx, cmd), &ctx.builddir)?;
        Ok(())
    }
}

impl Easyblock for Binary {
    fn name(&self) -> &'static str {
        "Binary"
    }

    fn extract_step(&self, ctx: &BuildContext, _runner: &dyn CommandRunner) -> Result<()> {
        copy_sources(ctx)
    }

    fn install_step(&self, ctx: &BuildContext, runner: &dyn CommandRunner) -> Result<()> {
        match ctx.install_cmd_override() {
            Some(cmd) => Self::run_install_cmd(ctx, runner, cmd),
            None => copy_dir_all(&ctx.builddir, &ctx.installdir),
        }
    }

    fn install_command(&self, ctx: &BuildContext) -> Result<Option<String>> {
        Ok(ctx
            .install_cmd_override()
            .map(|cmd| Self::wrap_install_cmd(ctx, cmd)))
    }
}

/// Recursively copy the contents of `src` into `dst`, overwriting.
///
/// # Errors
///
/// Returns `BuildError::Io` if any file or directory cannot be copied.
pub fn copy_dir_all(src: &Path, dst: &Path) -> Result<()> {
    tracing::info!("copying {} to {}", src.display(), dst.display());
    std::fs::create_dir_all(dst)
        .map_err(|e| BuildError::io(format!("Failed to create {}", dst.display()), e))?;
    fs_extra::dir::copy(
        src,
        dst,
        &fs_extra::dir::CopyOptions::new()
            .content_only(true)
            .overwrite(true),
    )
    .map_err(|e| {
        BuildError::io(
            format!("Failed to copy {} to {}", src.display(), dst.display()),
            std::io::Error::other(e.to_string()),
        )
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::ShellRunner;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_extract_copies_without_unpacking() {
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("tool-1.0.tar.gz");
        fs::write(&src, b"not really gzip").unwrap();
        let mut ctx = BuildContext::new("tool", "1.0", tmp.path().join("i"), tmp.path().join("b"));
        ctx.sources.push(src);

        Binary.extract_step(&ctx, &ShellRunner::new()).unwrap();
        assert!(ctx.builddir.join("tool-1.0.tar.gz").is_file());
    }

    #[test]
    fn test_install_copies_build_dir() {
        let tmp = tempdir().unwrap();
        let ctx = BuildContext::new("tool", "1.0", tmp.path().join("i"), tmp.path().join("b"));
        fs::create_dir_all(ctx.builddir.join("bin")).unwrap();
        fs::write(ctx.builddir.join("bin/tool"), "#!/bin/sh\n").unwrap();

        Binary.install_step(&ctx, &ShellRunner::new()).unwrap();
        assert!(ctx.installdir.join("bin/tool").is_file());
        assert!(Binary.install_command(&ctx).unwrap().is_none());
    }

    #[test]
    fn test_install_runs_override_in_build_dir() {
        let tmp = tempdir().unwrap();
        let mut ctx = BuildContext::new("tool", "1.0", tmp.path().join("i"), tmp.path().join("b"));
        fs::create_dir_all(&ctx.builddir).unwrap();
        ctx.opts.preinstallopts = "FOO=bar".into();
        ctx.opts.install_cmd = Some("sh -c 'echo $FOO > installed'".into());

        Binary.install_step(&ctx, &ShellRunner::new()).unwrap();
        let marker = fs::read_to_string(ctx.builddir.join("installed")).unwrap();
        assert_eq!(marker.trim(), "bar");
        assert!(!ctx.installdir.exists());
    }

    #[test]
    fn test_failing_override_is_command_failed() {
        let tmp = tempdir().unwrap();
        let mut ctx = BuildContext::new("tool", "1.0", tmp.path().join("i"), tmp.path().join("b"));
        fs::create_dir_all(&ctx.builddir).unwrap();
        ctx.opts.install_cmd = Some("exit 1".into());

        let err = Binary.install_step(&ctx, &ShellRunner::new()).unwrap_err();
        assert!(matches!(err, BuildError::CommandFailed { .. }));
    }
}
