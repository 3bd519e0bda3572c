//! eb - install scientific software with easyblocks
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_panics_doc)]
//!
//! # Overview
//!
//! `eb` reads an easyconfig (a TOML description of one package), picks the
//! easyblock that knows how to install that software and drives it through
//! the build lifecycle: extract, configure, build, install, post-install,
//! sanity check and module file generation.
//!
//! # Directory Layout
//!
//! ```text
//! $EB_PREFIX/                      (default ~/.local/easybuild)
//! ├── software/<name>/<version>/   # Installations
//! ├── modules/all/<name>/<version> # Tcl module files
//! ├── build/<name>/<version>/      # Scratch build trees
//! ├── build/logs/                  # Build logs
//! └── sources/                     # Source archives and installers
//! ```

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::{Args, Parser, Subcommand};
use eb_core::paths::{Layout, try_eb_prefix};

pub mod cmd;
pub mod ui;

#[derive(Parser, Debug)]
#[command(name = "eb")]
#[command(author, version, about = "eb - install scientific software with easyblocks", long_about = None)]
pub struct Cli {
    /// Show what would happen without making changes
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Echo command output and log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub layout: LayoutArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides for where things are installed, built and looked up.
#[derive(Args, Debug, Clone, Default)]
pub struct LayoutArgs {
    /// Root for software/ and modules/
    #[arg(long, env = "EB_INSTALLPATH", global = true, value_name = "DIR")]
    pub installpath: Option<PathBuf>,

    /// Root for build directories and logs
    #[arg(long, env = "EB_BUILDPATH", global = true, value_name = "DIR")]
    pub buildpath: Option<PathBuf>,

    /// Directory searched for source files
    #[arg(long, env = "EB_SOURCEPATH", global = true, value_name = "DIR")]
    pub sourcepath: Option<PathBuf>,
}

impl LayoutArgs {
    /// The effective layout: explicit paths win, the rest sit under the
    /// prefix.
    pub fn resolve(&self) -> Result<Layout> {
        if let (Some(install), Some(build), Some(source)) =
            (&self.installpath, &self.buildpath, &self.sourcepath)
        {
            return Ok(Layout::new(install, build, source));
        }

        let prefix = try_eb_prefix()
            .ok_or_else(|| anyhow!("Could not determine home directory. Set EB_PREFIX."))?;
        let mut layout = Layout::under(&prefix);
        if let Some(dir) = &self.installpath {
            layout.install_root.clone_from(dir);
        }
        if let Some(dir) = &self.buildpath {
            layout.build_root.clone_from(dir);
        }
        if let Some(dir) = &self.sourcepath {
            layout.source_root.clone_from(dir);
        }
        Ok(layout)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install software from one or more easyconfigs
    #[command(visible_alias = "i")]
    Install {
        /// Easyconfig files, installed in order
        #[arg(required = true)]
        easyconfigs: Vec<PathBuf>,

        /// Do not check the installation for expected files
        #[arg(long)]
        skip_sanity_check: bool,

        /// Do not write a module file
        #[arg(long)]
        skip_module: bool,

        /// Keep the build directory after a successful install
        #[arg(long)]
        keep_builddir: bool,
    },
    /// Check an existing installation for its expected files
    SanityCheck {
        /// Easyconfig of the installed software
        easyconfig: PathBuf,
    },
    /// Print the module file for an existing installation
    Module {
        /// Easyconfig of the installed software
        easyconfig: PathBuf,
    },
    /// List available easyblocks
    #[command(visible_alias = "ls")]
    List,
    /// Show how an easyconfig would be installed
    Show {
        /// Easyconfig to inspect
        easyconfig: PathBuf,
    },
}
