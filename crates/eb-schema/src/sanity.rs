//! Sanity check path lists
//!
//! What a finished install must contain. The checking itself lives in the
//! host (`eb_core::sanity`); this is only the shape shared by easyconfigs
//! and easyblocks.

use serde::{Deserialize, Serialize};

/// One required path, or a set of alternatives of which one must exist.
///
/// In TOML a plain string is a single path and an array is a set of
/// alternatives: `files = ["bin/ghc", ["lib", "lib64"]]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSpec {
    /// Exactly this path.
    Single(String),
    /// Any one of these paths.
    AnyOf(Vec<String>),
}

impl PathSpec {
    /// Candidate paths, in order.
    pub fn candidates(&self) -> &[String] {
        match self {
            Self::Single(path) => std::slice::from_ref(path),
            Self::AnyOf(paths) => paths,
        }
    }
}

impl std::fmt::Display for PathSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single(path) => write!(f, "{path}"),
            Self::AnyOf(paths) => write!(f, "({})", paths.join(" or ")),
        }
    }
}

impl From<&str> for PathSpec {
    fn from(s: &str) -> Self {
        Self::Single(s.to_string())
    }
}

impl From<String> for PathSpec {
    fn from(s: String) -> Self {
        Self::Single(s)
    }
}

/// Required files and directories. Relative entries are taken relative to
/// the install directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanityPaths {
    /// Paths that must exist and must not be directories.
    #[serde(default)]
    pub files: Vec<PathSpec>,
    /// Paths that must be non-empty directories.
    #[serde(default)]
    pub dirs: Vec<PathSpec>,
}

impl SanityPaths {
    /// Build a sanity spec from plain file and directory lists.
    pub fn new<F, D>(files: F, dirs: D) -> Self
    where
        F: IntoIterator,
        F::Item: Into<PathSpec>,
        D: IntoIterator,
        D::Item: Into<PathSpec>,
    {
        Self {
            files: files.into_iter().map(Into::into).collect(),
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// Fallback used when neither the easyconfig nor the easyblock says
    /// anything: some library or binary directory was installed.
    pub fn fallback() -> Self {
        Self {
            files: Vec::new(),
            dirs: vec![PathSpec::AnyOf(vec![
                "bin".to_string(),
                "lib".to_string(),
                "lib64".to_string(),
            ])],
        }
    }

    /// True when nothing is required.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.dirs.is_empty()
    }
}
