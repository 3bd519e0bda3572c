//! Immutable per-run package metadata handed to every hook

use std::path::{Path, PathBuf};

use eb_schema::{BuildOptions, EasyConfig, ModuleSpec, PackageName, SanityPaths, Version};

use crate::error::Result;
use crate::paths::Layout;

/// Everything an easyblock may read about the package being installed.
///
/// Built once by the host before the first step and never mutated, so a value
/// one hook derives (such as the replay file path) is derived the same way by
/// any later hook.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Software name, case preserved.
    pub name: PackageName,
    /// Full version, including any build tag.
    pub version: Version,
    /// One-line description for the module file.
    pub description: String,
    /// Target install directory.
    pub installdir: PathBuf,
    /// Scratch directory sources are extracted into.
    pub builddir: PathBuf,
    /// Module file the host writes at the end.
    pub module_file: PathBuf,
    /// Source files, resolved against the source directory.
    pub sources: Vec<PathBuf>,
    /// Options for the generic steps (`install_cmd`, `configopts`, …).
    pub opts: BuildOptions,
    /// Effective parallelism for build commands.
    pub parallel: usize,
    /// Sanity paths from the easyconfig, overriding the easyblock's.
    pub sanity_override: Option<SanityPaths>,
    /// Extra module file content from the easyconfig.
    pub module_extra: ModuleSpec,
}

impl BuildContext {
    /// Minimal context with default options, mostly useful for tests and
    /// for callers that do not go through an easyconfig.
    pub fn new(
        name: &str,
        version: &str,
        installdir: impl Into<PathBuf>,
        builddir: impl Into<PathBuf>,
    ) -> Self {
        let installdir = installdir.into();
        Self {
            name: PackageName::new(name),
            version: Version::new(version),
            description: String::new(),
            module_file: installdir.join("module"),
            installdir,
            builddir: builddir.into(),
            sources: Vec::new(),
            opts: BuildOptions::default(),
            parallel: num_cpus::get(),
            sanity_override: None,
            module_extra: ModuleSpec::default(),
        }
    }

    /// Freeze an easyconfig into a context for the given directory layout.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::Config` if the easyconfig does not validate.
    pub fn from_easyconfig(ec: &EasyConfig, layout: &Layout) -> Result<Self> {
        ec.validate()?;
        let name = ec.package.name.as_str();
        let version = ec.package.version.as_str();

        let sources = ec
            .source
            .files
            .iter()
            .map(|f| {
                let path = Path::new(f);
                if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    layout.source_root.join(path)
                }
            })
            .collect();

        Ok(Self {
            name: ec.package.name.clone(),
            version: ec.package.version.clone(),
            description: ec.package.description.clone(),
            installdir: layout.software_dir(name, version),
            builddir: layout.build_dir(name, version),
            module_file: layout.module_file(name, version),
            sources,
            opts: ec.build.clone(),
            parallel: ec.build.parallel.unwrap_or_else(num_cpus::get),
            sanity_override: ec.sanity_check_paths.clone(),
            module_extra: ec.module.clone(),
        })
    }

    /// Version with any build tag removed.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::Version` if the version has an unexpected format.
    pub fn upstream_version(&self) -> Result<&str> {
        Ok(self.version.upstream()?)
    }

    /// `<builddir>/<name>-<upstream>`, the directory vendor tarballs unpack to.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::Version` if the version has an unexpected format.
    pub fn unpacked_dir(&self) -> Result<PathBuf> {
        Ok(self
            .builddir
            .join(format!("{}-{}", self.name, self.upstream_version()?)))
    }

    /// Directory generic build commands run in: the single top-level
    /// directory of the build directory if there is exactly one, otherwise
    /// the build directory itself.
    pub fn start_dir(&self) -> PathBuf {
        let Ok(entries) = std::fs::read_dir(&self.builddir) else {
            return self.builddir.clone();
        };
        let entries: Vec<_> = entries
            .filter_map(std::result::Result::ok)
            .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
            .collect();
        match entries.as_slice() {
            [only] if only.file_type().is_ok_and(|t| t.is_dir()) => only.path(),
            _ => self.builddir.clone(),
        }
    }

    /// The caller's install command override, if any.
    pub fn install_cmd_override(&self) -> Option<&str> {
        self.opts
            .install_cmd
            .as_deref()
            .filter(|cmd| !cmd.trim().is_empty())
    }
}
