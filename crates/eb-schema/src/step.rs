//! Lifecycle steps

use serde::{Deserialize, Serialize};

/// A lifecycle step, in the order the host runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Unpack or copy sources into the build directory.
    Extract,
    /// Prepare the build (answers files, `./configure`).
    Configure,
    /// Compile.
    Build,
    /// Run the installer into the install directory.
    Install,
    /// Touch up the installed tree (patches, permissions).
    PostInstall,
    /// Verify the expected files exist.
    SanityCheck,
    /// Write the environment module file.
    Module,
}

impl Step {
    /// All steps in execution order.
    pub const ORDER: [Step; 7] = [
        Step::Extract,
        Step::Configure,
        Step::Build,
        Step::Install,
        Step::PostInstall,
        Step::SanityCheck,
        Step::Module,
    ];

    /// Name used in logs and in `skipsteps`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Extract => "extract",
            Self::Configure => "configure",
            Self::Build => "build",
            Self::Install => "install",
            Self::PostInstall => "post_install",
            Self::SanityCheck => "sanity_check",
            Self::Module => "module",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
