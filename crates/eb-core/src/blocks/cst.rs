//! CST STUDIO SUITE
//!
//! The vendor tarball unpacks to `<builddir>/CST-<upstream>/`, which holds
//! `install.sh` and a `cst.patch` for the installed launcher scripts. The
//! installer is replayed from an answers file so it runs without a GUI.

use std::path::PathBuf;

use eb_schema::SanityPaths;

use crate::context::BuildContext;
use crate::easyblock::{Easyblock, quote_path, unpack_sources};
use crate::error::{BuildError, Result};
use crate::generic::Binary;
use crate::module::ModuleGuesses;
use crate::patch::apply_patch;
use crate::run::CommandRunner;

/// Answers file template; `{installdir}` is the only substitution.
const REPLAY_TEMPLATE: &str = "\
CHOSEN_FEATURE_LIST=Frontend
CHOSEN_INSTALL_FEATURE_LIST=Frontend
CHOSEN_INSTALL_SET=Custom
LICENSE_TYPE=floating
LICENSE_TYPE_1=
LICENSE_TYPE_2=Point to an existing CST license server system
LICENSE_TYPE_BOOLEAN_1=0
LICENSE_TYPE_BOOLEAN_2=1
LICENSE_SERV_INPUT=\\\"cst@local\\\"
LICENSE_SERV_INPUT_1=cst@local
LICENSE_SERV_INPUT_BOOLEAN_1=
USER_INSTALL_DIR={installdir}
";

const SANITY_FILES: [&str; 3] = [
    "cst_design_environment",
    "cst_design_environment_gui",
    "cst_boardcheck",
];

/// Installs CST STUDIO SUITE through its replayable `install.sh`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cst {
    binary: Binary,
}

/// Where the answers file goes: `<builddir>/<name>-<upstream>/installer.properties`.
///
/// # Errors
///
/// Returns `BuildError::Version` if the version has no upstream part.
pub fn replay_file_path(ctx: &BuildContext) -> Result<PathBuf> {
    Ok(ctx.unpacked_dir()?.join("installer.properties"))
}

/// Answers file contents for `ctx`.
pub fn replay_file_contents(ctx: &BuildContext) -> String {
    REPLAY_TEMPLATE.replace("{installdir}", &ctx.installdir.display().to_string())
}

impl Cst {
    fn default_install_cmd(ctx: &BuildContext) -> Result<String> {
        let script = ctx.unpacked_dir()?.join("install.sh");
        Ok(format!(
            "sh {} --replay {} --nogui --no-pkg-check",
            quote_path(&script),
            quote_path(&replay_file_path(ctx)?)
        ))
    }
}

impl Easyblock for Cst {
    fn name(&self) -> &'static str {
        "CST"
    }

    // Unpack like any other package; Binary would only copy the tarball.
    fn extract_step(&self, ctx: &BuildContext, _runner: &dyn CommandRunner) -> Result<()> {
        unpack_sources(ctx)
    }

    fn configure_step(&self, ctx: &BuildContext, _runner: &dyn CommandRunner) -> Result<()> {
        let path = replay_file_path(ctx)?;
        tracing::info!("writing installer answers to {}", path.display());
        std::fs::write(&path, replay_file_contents(ctx))
            .map_err(|source| BuildError::ReplayFile { path, source })
    }

    fn install_step(&self, ctx: &BuildContext, runner: &dyn CommandRunner) -> Result<()> {
        match ctx.install_cmd_override() {
            Some(_) => self.binary.install_step(ctx, runner),
            None => Binary::run_install_cmd(ctx, runner, &Self::default_install_cmd(ctx)?),
        }
    }

    fn post_install_step(&self, ctx: &BuildContext, runner: &dyn CommandRunner) -> Result<()> {
        self.binary.post_install_step(ctx, runner)?;
        let patch = ctx.unpacked_dir()?.join("cst.patch");
        apply_patch(runner, &patch, &ctx.installdir, None)
    }

    fn sanity_check_paths(&self, _ctx: &BuildContext) -> Result<Option<SanityPaths>> {
        Ok(Some(SanityPaths::new(SANITY_FILES, Vec::<&str>::new())))
    }

    fn module_req_guess(&self, ctx: &BuildContext) -> Result<ModuleGuesses> {
        let mut guesses = self.binary.module_req_guess(ctx)?;
        // Launchers sit at the top of the install directory.
        guesses.insert("PATH".to_string(), vec![String::new()]);
        Ok(guesses)
    }

    fn install_command(&self, ctx: &BuildContext) -> Result<Option<String>> {
        match self.binary.install_command(ctx)? {
            Some(cmd) => Ok(Some(cmd)),
            None => Self::default_install_cmd(ctx).map(Some),
        }
    }
}
