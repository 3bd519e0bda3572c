//! Easyconfig parsing
//!
//! An easyconfig is the human-written TOML description of one package
//! build: which software and version, where its sources are, which
//! easyblock drives it and any per-package tweaks to the generic steps.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sanity::SanityPaths;
use crate::step::Step;
pub use crate::types::{PackageName, Version, VersionError};

/// Errors that can occur when loading or validating an easyconfig.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An I/O error occurred while reading an easyconfig file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The TOML content could not be deserialized into a valid easyconfig.
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// The version cannot be split into an upstream version.
    #[error("Invalid version: {0}")]
    Version(#[from] VersionError),

    /// A field holds a value the build cannot work with.
    #[error("Invalid easyconfig: {0}")]
    Invalid(String),
}

/// Identity of the software being installed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageInfo {
    /// Software name, used verbatim in directory names (e.g. `STAR-CCM+`).
    pub name: PackageName,
    /// Version, optionally with a `-` separated vendor build tag.
    pub version: Version,
    /// Easyblock to use. Defaults to the one registered for `name`.
    #[serde(default)]
    pub easyblock: Option<String>,
    /// Short human-readable summary, shown in the module file help.
    #[serde(default)]
    pub description: String,
    /// URL of the project's homepage.
    #[serde(default)]
    pub homepage: String,
}

/// Source archives and installers, looked up in the source directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceSpec {
    /// File names relative to the source directory (absolute paths are kept).
    #[serde(default)]
    pub files: Vec<String>,
}

/// Knobs for the generic configure/build/install commands.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Replaces the easyblock's default install command entirely.
    #[serde(default)]
    pub install_cmd: Option<String>,
    /// Extra arguments for `configure`.
    #[serde(default)]
    pub configopts: String,
    /// Extra arguments for `make`.
    #[serde(default)]
    pub buildopts: String,
    /// Extra arguments for `make install`.
    #[serde(default)]
    pub installopts: String,
    /// Prefix for the configure command (e.g. `env CC=gcc`).
    #[serde(default)]
    pub preconfigopts: String,
    /// Prefix for the build command.
    #[serde(default)]
    pub prebuildopts: String,
    /// Prefix for the install command.
    #[serde(default)]
    pub preinstallopts: String,
    /// Parallel build jobs. Defaults to the number of logical CPUs.
    #[serde(default)]
    pub parallel: Option<usize>,
    /// Steps the host must not run for this package.
    #[serde(default)]
    pub skipsteps: Vec<Step>,
}

impl BuildOptions {
    /// Whether the host is asked to skip `step`.
    pub fn skips(&self, step: Step) -> bool {
        self.skipsteps.contains(&step)
    }
}

/// Additions to the generated environment module.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleSpec {
    /// Extra relative paths to prepend, per environment variable.
    #[serde(default)]
    pub extra_paths: BTreeMap<String, Vec<String>>,
    /// Extra environment variables to set.
    #[serde(default)]
    pub extra_vars: BTreeMap<String, String>,
}

/// Complete easyconfig as read from disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EasyConfig {
    /// Software identity and easyblock selection.
    pub package: PackageInfo,
    /// Source files for the extract step.
    #[serde(default)]
    pub source: SourceSpec,
    /// Options for the generic build steps.
    #[serde(default)]
    pub build: BuildOptions,
    /// Overrides the easyblock's sanity check paths when present.
    #[serde(default)]
    pub sanity_check_paths: Option<SanityPaths>,
    /// Module file additions.
    #[serde(default)]
    pub module: ModuleSpec,
}

impl EasyConfig {
    /// Parse an easyconfig from a TOML file on disk.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read, or any error
    /// from [`EasyConfig::parse`].
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate an easyconfig from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the TOML is invalid, or the error
    /// from [`EasyConfig::validate`].
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the fields the build depends on before any step runs.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for an empty name or a zero
    /// `parallel`, and `ConfigError::Version` if the version has no usable
    /// upstream part.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.package.name.trim().is_empty() {
            return Err(ConfigError::Invalid("name must not be empty".to_string()));
        }
        if self.package.name.contains('/') {
            return Err(ConfigError::Invalid(format!(
                "name '{}' must not contain '/'",
                self.package.name
            )));
        }
        self.package.version.upstream()?;
        if self.build.parallel == Some(0) {
            return Err(ConfigError::Invalid(
                "parallel must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl std::str::FromStr for EasyConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
