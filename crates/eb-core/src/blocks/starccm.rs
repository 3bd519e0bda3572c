//! STAR-CCM+
//!
//! The vendor ships a self-extracting `STAR-CCM+<version>_..._linux-x86_64.bin`
//! which installs into `<prefix>/<version>/STAR-CCM+<upstream>/`. It is given
//! the parent of the install directory, so `<prefix>/<version>` is the install
//! directory itself.

use std::path::{Path, PathBuf};

use eb_schema::SanityPaths;
use walkdir::WalkDir;

use crate::context::BuildContext;
use crate::easyblock::{Easyblock, quote_path};
use crate::error::{BuildError, Result};
use crate::generic::{Binary, PackedBinary};
use crate::module::ModuleGuesses;
use crate::run::CommandRunner;

const INSTALLER_GLOB: &str = "STAR-CCM+*.bin";

/// Installs STAR-CCM+ through its silent installer.
#[derive(Debug, Clone, Copy, Default)]
pub struct StarCcm {
    inner: PackedBinary,
}

impl StarCcm {
    /// Locate the installer: first in the start directory, then anywhere
    /// under the build directory. With several matches the first in path
    /// order wins.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::InstallerNotFound` if there is none.
    pub fn find_installer(ctx: &BuildContext) -> Result<PathBuf> {
        let pattern = glob::Pattern::new(INSTALLER_GLOB).map_err(|e| {
            BuildError::InstallerNotFound {
                pattern: format!("{INSTALLER_GLOB} ({e})"),
            }
        })?;
        let start = ctx.start_dir();

        for (root, depth) in [(&start, 1), (&ctx.builddir, usize::MAX)] {
            let mut found: Vec<PathBuf> = WalkDir::new(root)
                .min_depth(1)
                .max_depth(depth)
                .into_iter()
                .filter_map(std::result::Result::ok)
                .filter(|e| e.file_type().is_file())
                .filter(|e| pattern.matches(&e.file_name().to_string_lossy()))
                .map(walkdir::DirEntry::into_path)
                .collect();
            found.sort();
            if let Some(first) = found.first() {
                if found.len() > 1 {
                    tracing::warn!(
                        "{} installers match {INSTALLER_GLOB}, using {}",
                        found.len(),
                        first.display()
                    );
                }
                return Ok(first.clone());
            }
        }

        Err(BuildError::InstallerNotFound {
            pattern: start.join(INSTALLER_GLOB).display().to_string(),
        })
    }

    /// Installer invocation, relative to the installer's own directory.
    fn installer_cmd(installer: &Path, ctx: &BuildContext) -> String {
        let local = installer
            .file_name()
            .map_or_else(|| installer.to_path_buf(), |n| Path::new(".").join(n));
        Binary::wrap_install_cmd(
            ctx,
            &format!(
                "{} -DINSTALLDIR={} -DINSTALLFLEX=false -DNODOC=true -i silent",
                quote_path(&local),
                quote_path(&ctx.installdir.join(".."))
            ),
        )
    }

    /// `STAR-CCM+<upstream>/star/bin`, relative to the install directory.
    fn bin_dir(ctx: &BuildContext) -> Result<PathBuf> {
        Ok(PathBuf::from(format!("STAR-CCM+{}", ctx.upstream_version()?))
            .join("star")
            .join("bin"))
    }
}

impl Easyblock for StarCcm {
    fn name(&self) -> &'static str {
        "STAR-CCM+"
    }

    fn install_step(&self, ctx: &BuildContext, runner: &dyn CommandRunner) -> Result<()> {
        if ctx.install_cmd_override().is_some() {
            return self.inner.install_step(ctx, runner);
        }
        let installer = Self::find_installer(ctx)?;
        let workdir = installer.parent().unwrap_or(&ctx.builddir);
        runner.run(&Self::installer_cmd(&installer, ctx), workdir)?;
        Ok(())
    }

    fn sanity_check_paths(&self, ctx: &BuildContext) -> Result<Option<SanityPaths>> {
        let starccm = Self::bin_dir(ctx)?.join("starccm+");
        Ok(Some(SanityPaths::new(
            [starccm.display().to_string()],
            Vec::<String>::new(),
        )))
    }

    fn module_req_guess(&self, ctx: &BuildContext) -> Result<ModuleGuesses> {
        let mut guesses = self.inner.module_req_guess(ctx)?;
        guesses.insert(
            "PATH".to_string(),
            vec![Self::bin_dir(ctx)?.display().to_string()],
        );
        Ok(guesses)
    }

    fn install_command(&self, ctx: &BuildContext) -> Result<Option<String>> {
        if let Some(cmd) = self.inner.install_command(ctx)? {
            return Ok(Some(cmd));
        }
        let installer = Self::find_installer(ctx)?;
        Ok(Some(Self::installer_cmd(&installer, ctx)))
    }
}
