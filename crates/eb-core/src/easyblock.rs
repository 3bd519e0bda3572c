//! The lifecycle contract every easyblock implements.
//!
//! The host [`Pipeline`](crate::pipeline::Pipeline) calls the hooks in the
//! order of [`Step::ORDER`](eb_schema::Step::ORDER):
//!
//! | Step | Hook | Default |
//! |---|---|---|
//! | extract | [`Easyblock::extract_step`] | unpack every source into the build directory |
//! | configure | [`Easyblock::configure_step`] | nothing |
//! | build | [`Easyblock::build_step`] | nothing |
//! | install | [`Easyblock::install_step`] | nothing |
//! | post_install | [`Easyblock::post_install_step`] | nothing |
//! | sanity_check | [`Easyblock::sanity_check_paths`] | no custom paths |
//! | module | [`Easyblock::module_req_guess`] | [`default_guesses`] |
//!
//! Hooks never see mutable state: everything they need is in the
//! [`BuildContext`], and external commands go through the
//! [`CommandRunner`] they are handed.

use std::path::Path;

use eb_schema::SanityPaths;

use crate::context::BuildContext;
use crate::error::Result;
use crate::extract;
use crate::module::{ModuleGuesses, default_guesses};
use crate::run::CommandRunner;

/// Install recipe for one kind of package.
pub trait Easyblock: std::fmt::Debug {
    /// Registry name (`CST`, `ConfigureMake`, …).
    fn name(&self) -> &'static str;

    /// Place sources in the build directory.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::Extract` if a source is missing or corrupt.
    fn extract_step(&self, ctx: &BuildContext, _runner: &dyn CommandRunner) -> Result<()> {
        unpack_sources(ctx)
    }

    /// Prepare the build: write answers files, run `configure`.
    ///
    /// # Errors
    ///
    /// Implementations return whatever prevented configuration.
    fn configure_step(&self, _ctx: &BuildContext, _runner: &dyn CommandRunner) -> Result<()> {
        Ok(())
    }

    /// Compile.
    ///
    /// # Errors
    ///
    /// Implementations return whatever prevented the build.
    fn build_step(&self, _ctx: &BuildContext, _runner: &dyn CommandRunner) -> Result<()> {
        Ok(())
    }

    /// Install into `ctx.installdir`.
    ///
    /// # Errors
    ///
    /// Usually `BuildError::CommandFailed` from the installer.
    fn install_step(&self, _ctx: &BuildContext, _runner: &dyn CommandRunner) -> Result<()> {
        Ok(())
    }

    /// Touch up the installed tree.
    ///
    /// # Errors
    ///
    /// Implementations return whatever prevented the fix-up.
    fn post_install_step(&self, _ctx: &BuildContext, _runner: &dyn CommandRunner) -> Result<()> {
        Ok(())
    }

    /// Paths the sanity check must find. `None` lets the host fall back to
    /// its default.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::Version` when the paths depend on a version that
    /// cannot be parsed.
    fn sanity_check_paths(&self, _ctx: &BuildContext) -> Result<Option<SanityPaths>> {
        Ok(None)
    }

    /// Candidate subdirectories for the module file's search paths.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::Version` when the guesses depend on a version
    /// that cannot be parsed.
    fn module_req_guess(&self, _ctx: &BuildContext) -> Result<ModuleGuesses> {
        Ok(default_guesses())
    }

    /// The shell command the install step will run, or `None` if it does not
    /// run one. Used for dry runs and `eb show`.
    ///
    /// # Errors
    ///
    /// Returns the error the install step would fail with while building the
    /// command (e.g. `BuildError::InstallerNotFound`).
    fn install_command(&self, ctx: &BuildContext) -> Result<Option<String>> {
        Ok(ctx.install_cmd_override().map(str::to_string))
    }
}

/// Unpack every source of `ctx` into its build directory.
///
/// # Errors
///
/// Returns `BuildError::Extract` for the first source that fails.
pub fn unpack_sources(ctx: &BuildContext) -> Result<()> {
    for source in &ctx.sources {
        extract::unpack(source, &ctx.builddir)?;
    }
    Ok(())
}

/// Copy every source of `ctx` into its build directory unchanged.
///
/// # Errors
///
/// Returns `BuildError::Extract` for the first source that fails.
pub fn copy_sources(ctx: &BuildContext) -> Result<()> {
    for source in &ctx.sources {
        tracing::info!("copying {}", source.display());
        extract::copy(source, &ctx.builddir)?;
    }
    Ok(())
}

/// Join non-empty command fragments with single spaces.
///
/// ```
/// use eb_core::easyblock::join_cmd;
///
/// assert_eq!(join_cmd(&["", "make install", " "]), "make install");
/// assert_eq!(join_cmd(&["env CC=gcc", "./configure"]), "env CC=gcc ./configure");
/// ```
pub fn join_cmd(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `path` as one POSIX shell word, quoted only when it needs to be.
///
/// ```
/// use std::path::Path;
/// use eb_core::easyblock::quote_path;
///
/// assert_eq!(quote_path(Path::new("/opt/cst/install.sh")), "/opt/cst/install.sh");
/// assert_eq!(quote_path(Path::new("/home/John Doe/build")), "'/home/John Doe/build'");
/// ```
pub fn quote_path(path: &Path) -> String {
    // NUL is the only thing shlex refuses, and no real path holds one.
    let text = path.to_string_lossy().replace('\0', "");
    shlex::try_quote(&text).map_or_else(|_| text.clone(), std::borrow::Cow::into_owned)
}
