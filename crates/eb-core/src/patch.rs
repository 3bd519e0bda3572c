//! Applying patch files onto a source or install tree

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::easyblock::quote_path;
use crate::error::{BuildError, Result};
use crate::run::CommandRunner;

static TARGET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\+\+\+\s+(\S+)").unwrap());

/// Deepest strip level tried when guessing.
const MAX_LEVEL: usize = 5;

/// Apply `patch_file` inside `target_dir`.
///
/// With `level = None` the strip level is guessed from the files the patch
/// touches. The original of every patched file is kept with a `.orig`
/// suffix.
///
/// # Errors
///
/// Returns `BuildError::Patch` if the patch file is missing or no strip
/// level matches the target tree, `BuildError::MissingTool` if `patch` is
/// not installed, and `BuildError::CommandFailed` if `patch` rejects it.
pub fn apply_patch(
    runner: &dyn CommandRunner,
    patch_file: &Path,
    target_dir: &Path,
    level: Option<usize>,
) -> Result<()> {
    if !patch_file.is_file() {
        return Err(BuildError::Patch {
            patch: patch_file.to_path_buf(),
            reason: "patch file not found".to_string(),
        });
    }

    let level = match level {
        Some(level) => level,
        None => {
            let content = std::fs::read_to_string(patch_file).map_err(|e| {
                BuildError::io(format!("Failed to read {}", patch_file.display()), e)
            })?;
            guess_patch_level(&content, target_dir).ok_or_else(|| BuildError::Patch {
                patch: patch_file.to_path_buf(),
                reason: format!(
                    "could not determine patch level for {}",
                    target_dir.display()
                ),
            })?
        }
    };

    which::which("patch").map_err(|_| BuildError::MissingTool("patch".to_string()))?;

    tracing::info!(
        "applying patch {} (-p{level}) in {}",
        patch_file.display(),
        target_dir.display()
    );
    let cmd = format!("patch -b -p{level} -i {}", quote_path(patch_file));
    runner.run(&cmd, target_dir)?;
    Ok(())
}

/// Files a unified diff patches, as written on its `+++` lines.
pub fn patched_files(content: &str) -> Vec<PathBuf> {
    TARGET_RE
        .captures_iter(content)
        .filter_map(|c| c.get(1))
        .map(|m| PathBuf::from(m.as_str()))
        .filter(|p| p.as_os_str() != "/dev/null")
        .collect()
}

/// Smallest strip level at which a file the patch touches exists under
/// `target_dir`.
pub fn guess_patch_level(content: &str, target_dir: &Path) -> Option<usize> {
    for file in patched_files(content) {
        let components: Vec<_> = file.components().collect();
        for level in 0..=MAX_LEVEL.min(components.len().saturating_sub(1)) {
            let stripped: PathBuf = components[level..].iter().collect();
            if target_dir.join(&stripped).exists() {
                tracing::debug!("patch level {level} matches {}", stripped.display());
                return Some(level);
            }
        }
    }
    None
}
