//! Post-install sanity checking

use std::path::{Path, PathBuf};

use eb_schema::{PathSpec, SanityPaths};

use crate::error::{BuildError, Result};

/// Resolve `path` against the install directory unless it is absolute.
fn resolve(installdir: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        installdir.join(p)
    }
}

fn is_file_like(path: &Path) -> bool {
    path.exists() && !path.is_dir()
}

fn is_nonempty_dir(path: &Path) -> bool {
    walkdir::WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .next()
        .is_some_and(|entry| entry.is_ok())
}

fn describe(installdir: &Path, spec: &PathSpec) -> String {
    match spec {
        PathSpec::Single(path) => resolve(installdir, path).display().to_string(),
        PathSpec::AnyOf(paths) => {
            let resolved: Vec<String> = paths
                .iter()
                .map(|p| resolve(installdir, p).display().to_string())
                .collect();
            format!("({})", resolved.join(" or "))
        }
    }
}

/// Check that every required path exists under `installdir`.
///
/// Files must exist and not be directories; directories must exist and
/// contain at least one entry. All entries are checked before failing so the
/// error lists everything that is missing.
///
/// # Errors
///
/// Returns `BuildError::SanityCheck` naming each missing path.
pub fn check_paths(installdir: &Path, paths: &SanityPaths) -> Result<()> {
    let mut missing = Vec::new();

    for spec in &paths.files {
        let found = spec
            .candidates()
            .iter()
            .any(|p| is_file_like(&resolve(installdir, p)));
        if found {
            tracing::debug!("sanity: found file {spec}");
        } else {
            missing.push(describe(installdir, spec));
        }
    }

    for spec in &paths.dirs {
        let found = spec
            .candidates()
            .iter()
            .any(|p| is_nonempty_dir(&resolve(installdir, p)));
        if found {
            tracing::debug!("sanity: found non-empty directory {spec}");
        } else {
            missing.push(describe(installdir, spec));
        }
    }

    if missing.is_empty() {
        tracing::info!("sanity check passed for {}", installdir.display());
        Ok(())
    } else {
        for path in &missing {
            tracing::error!("sanity check: missing {path}");
        }
        Err(BuildError::SanityCheck { missing })
    }
}

/// Pick the paths to check: the easyconfig's if it has any, otherwise the
/// easyblock's, otherwise [`SanityPaths::fallback`].
pub fn select_paths(
    from_easyconfig: Option<&SanityPaths>,
    from_easyblock: Option<SanityPaths>,
) -> SanityPaths {
    from_easyconfig
        .filter(|p| !p.is_empty())
        .cloned()
        .or(from_easyblock)
        .unwrap_or_else(SanityPaths::fallback)
}
