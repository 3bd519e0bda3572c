//! Directory layout: where software, modules, builds and sources live

use dirs::home_dir;
use std::path::{Path, PathBuf};

/// The prefix installs, builds and sources live under by default:
/// `$EB_PREFIX`, else `~/.local/easybuild`. None if the home directory
/// cannot be resolved.
pub fn try_eb_prefix() -> Option<PathBuf> {
    if let Ok(val) = std::env::var("EB_PREFIX") {
        return Some(PathBuf::from(val));
    }
    home_dir().map(|h| h.join(".local").join("easybuild"))
}

/// Where software, modules, build trees and sources go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Root of installations: `<install_root>/software/<name>/<version>`.
    pub install_root: PathBuf,
    /// Root of per-package build directories.
    pub build_root: PathBuf,
    /// Directory searched for relative source file names.
    pub source_root: PathBuf,
}

impl Layout {
    /// Layout with explicit roots.
    pub fn new(
        install_root: impl Into<PathBuf>,
        build_root: impl Into<PathBuf>,
        source_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            install_root: install_root.into(),
            build_root: build_root.into(),
            source_root: source_root.into(),
        }
    }

    /// Layout rooted at `prefix` (usually [`try_eb_prefix`]), with `build/` and
    /// `sources/` inside it.
    pub fn under(prefix: &Path) -> Self {
        Self::new(prefix, prefix.join("build"), prefix.join("sources"))
    }

    /// Install directory of one package: `<install_root>/software/<name>/<version>`.
    pub fn software_dir(&self, name: &str, version: &str) -> PathBuf {
        self.install_root.join("software").join(name).join(version)
    }

    /// Module file of one package: `<install_root>/modules/all/<name>/<version>`.
    pub fn module_file(&self, name: &str, version: &str) -> PathBuf {
        self.install_root
            .join("modules")
            .join("all")
            .join(name)
            .join(version)
    }

    /// Build directory of one package: `<build_root>/<name>/<version>`.
    pub fn build_dir(&self, name: &str, version: &str) -> PathBuf {
        self.build_root.join(name).join(version)
    }

    /// Logs directory: `<build_root>/logs`.
    pub fn log_dir(&self) -> PathBuf {
        self.build_root.join("logs")
    }

    /// Generate a build log path for a package.
    pub fn build_log_path(&self, name: &str, version: &str) -> PathBuf {
        let timestamp = chrono::Utc::now().format("%Y%m%d-%H%M%S");
        self.log_dir()
            .join(format!("easybuild-{name}-{version}-{timestamp}.log"))
    }
}
