//! Package name and version newtypes

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;

/// Errors that can occur when interpreting a [`Version`] string.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum VersionError {
    /// The version string is empty.
    #[error("Empty version string")]
    Empty,

    /// Nothing precedes the first `-`, so no upstream version can be recovered.
    #[error("Version '{0}' has no upstream part before its build tag")]
    MissingUpstream(String),

    /// The upstream part contains characters that cannot appear in a path segment.
    #[error("Version '{0}' contains whitespace or a path separator")]
    InvalidCharacters(String),
}

/// A software name as it appears in an easyconfig (e.g. `STAR-CCM+`).
///
/// Unlike package registries that normalise names, installers and vendor
/// archives embed the name verbatim in directory names, so case is preserved.
/// Comparisons against plain strings are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageName(String);

impl PackageName {
    /// Create a new package name, keeping the input as-is.
    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }

    /// Return the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Suffix used for the `EBROOT*` / `EBVERSION*` environment variables.
    ///
    /// Upper-cases the name and spells out characters that are not valid in
    /// an environment variable name: `-` becomes `MIN`, `+` becomes `PLUS`,
    /// `.` is dropped and anything else non-alphanumeric becomes `_`.
    ///
    /// ```
    /// use eb_schema::PackageName;
    ///
    /// assert_eq!(PackageName::new("STAR-CCM+").env_suffix(), "STARMINCCMPLUS");
    /// assert_eq!(PackageName::new("GHC").env_suffix(), "GHC");
    /// ```
    pub fn env_suffix(&self) -> String {
        let mut out = String::with_capacity(self.0.len());
        for c in self.0.chars() {
            match c {
                '-' => out.push_str("MIN"),
                '+' => out.push_str("PLUS"),
                '.' => {}
                c if c.is_ascii_alphanumeric() => out.push(c.to_ascii_uppercase()),
                _ => out.push('_'),
            }
        }
        out
    }
}

impl AsRef<std::ffi::OsStr> for PackageName {
    fn as_ref(&self) -> &std::ffi::OsStr {
        self.0.as_ref()
    }
}

impl AsRef<std::path::Path> for PackageName {
    fn as_ref(&self) -> &std::path::Path {
        std::path::Path::new(&self.0)
    }
}

impl std::fmt::Display for PackageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Deref for PackageName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for PackageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for PackageName {
    fn eq(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl PartialEq<&str> for PackageName {
    fn eq(&self, other: &&str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl Borrow<str> for PackageName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PackageName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PackageName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A version string as given in an easyconfig, possibly carrying a vendor
/// build tag after the first `-` (e.g. `2019.05-GA`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(String);

impl Version {
    /// Create a new version from the given string (stored as-is).
    pub fn new(v: &str) -> Self {
        Self(v.to_string())
    }

    /// Return the version string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The upstream version: everything before the first `-`.
    ///
    /// Vendor archives unpack into `<name>-<upstream>` even when the
    /// easyconfig version carries a build tag, so every path derived from
    /// the version must go through this.
    ///
    /// ```
    /// use eb_schema::Version;
    ///
    /// assert_eq!(Version::new("2019.05-GA").upstream().unwrap(), "2019.05");
    /// assert_eq!(Version::new("8.6.5").upstream().unwrap(), "8.6.5");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`VersionError`] if the version is empty, starts with `-`, or
    /// the upstream part contains whitespace or a path separator.
    pub fn upstream(&self) -> Result<&str, VersionError> {
        if self.0.is_empty() {
            return Err(VersionError::Empty);
        }
        let upstream = self.0.split('-').next().unwrap_or_default();
        if upstream.is_empty() {
            return Err(VersionError::MissingUpstream(self.0.clone()));
        }
        if upstream
            .chars()
            .any(|c| c.is_whitespace() || c == '/' || c == '\\')
        {
            return Err(VersionError::InvalidCharacters(self.0.clone()));
        }
        Ok(upstream)
    }

    /// Loose comparison that tolerates two-component and alphanumeric versions.
    pub fn loose_cmp(&self, other: &str) -> Ordering {
        LooseVersion::new(&self.0).cmp(&LooseVersion::new(other))
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Deref for Version {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for Version {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Version {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Version {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<str> for Version {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Version {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl AsRef<std::path::Path> for Version {
    fn as_ref(&self) -> &std::path::Path {
        std::path::Path::new(&self.0)
    }
}

static COMPONENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+|[A-Za-z]+").unwrap());

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Component {
    // Numbers sort before words: `7.0` < `7.0rc1`.
    Number(u64),
    Word(String),
}

/// A version split into numeric and alphabetic runs, compared piecewise.
///
/// `6.12.3` < `7.0` < `7.0.1` < `7.10`.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct LooseVersion(Vec<Component>);

impl LooseVersion {
    fn new(v: &str) -> Self {
        Self(
            COMPONENT_RE
                .find_iter(v)
                .map(|m| {
                    m.as_str().parse::<u64>().map_or_else(
                        |_| Component::Word(m.as_str().to_lowercase()),
                        Component::Number,
                    )
                })
                .collect(),
        )
    }
}
