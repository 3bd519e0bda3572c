//! The build error surfaced to the host

use std::path::PathBuf;

use eb_schema::{ConfigError, VersionError};
use thiserror::Error;

use crate::extract::ExtractError;

/// Every failure an easyblock or the host can report.
///
/// None of these are retried; any of them aborts the run for the package.
#[derive(Error, Debug)]
pub enum BuildError {
    /// An external command exited non-zero (or was killed by a signal).
    #[error("Command failed with exit code {code:?}: {cmd}\n{output}")]
    CommandFailed {
        /// The command line as passed to the shell.
        cmd: String,
        /// Exit code, `None` if terminated by a signal.
        code: Option<i32>,
        /// Tail of the captured stdout/stderr.
        output: String,
    },

    /// Writing an installer answers file failed.
    #[error(
        "Failed to create install properties file used for replaying installation: {}: {source}",
        .path.display()
    )]
    ReplayFile {
        /// Where the file was being written.
        path: PathBuf,
        /// The underlying write error.
        #[source]
        source: std::io::Error,
    },

    /// Required files or directories are missing after installation.
    #[error("Sanity check failed, missing: {}", format_missing(.missing))]
    SanityCheck {
        /// Every path (or set of alternatives) that was not found.
        missing: Vec<String>,
    },

    /// A patch could not be located or its strip level determined.
    #[error("Failed to apply patch {}: {reason}", .patch.display())]
    Patch {
        /// The patch file.
        patch: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// No vendor installer matched the expected file pattern.
    #[error("No installer found matching {pattern}")]
    InstallerNotFound {
        /// The glob that was searched.
        pattern: String,
    },

    /// No easyblock is registered for the requested name.
    #[error("No easyblock found for '{0}'")]
    UnknownEasyblock(String),

    /// A required external tool is not on `PATH`.
    #[error("Required tool '{0}' not found on PATH")]
    MissingTool(String),

    /// The version cannot be turned into paths.
    #[error("Invalid version: {0}")]
    Version(#[from] VersionError),

    /// The easyconfig could not be loaded.
    #[error("Invalid easyconfig: {0}")]
    Config(#[from] ConfigError),

    /// Unpacking a source archive failed.
    #[error("Extraction failed: {0}")]
    Extract(#[from] ExtractError),

    /// A filesystem operation performed by the host failed.
    #[error("{context}: {source}")]
    Io {
        /// What the host was doing.
        context: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl BuildError {
    /// Wrap an I/O error with a description of the operation.
    pub fn io(context: impl std::fmt::Display, source: std::io::Error) -> Self {
        Self::Io {
            context: context.to_string(),
            source,
        }
    }
}

/// Result alias used throughout the host and the easyblocks.
pub type Result<T> = std::result::Result<T, BuildError>;

fn format_missing(missing: &[String]) -> String {
    missing.join(", ")
}
