//! Archive extraction module
//!
//! Unpacks source archives into the build directory. Top-level directories
//! are kept: vendor tarballs such as `CST-2019.05.tar.gz` unpack to
//! `<builddir>/CST-2019.05/` and easyblocks rely on that.

use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use zip::ZipArchive;
use zstd::stream::Decoder as ZstdDecoder;

/// Errors that can occur while unpacking or copying a source.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Reading the source or writing into the build directory failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The source file does not exist.
    #[error("Source file not found: {}", .0.display())]
    Missing(PathBuf),

    /// The archive is corrupt or contains unsafe paths.
    #[error("Archive error: {0}")]
    Archive(String),
}

/// Source file formats recognised by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// `.tar.gz` / `.tgz`
    TarGz,
    /// `.tar.zst` / `.tzst`
    TarZst,
    /// `.tar.xz` / `.txz`
    TarXz,
    /// `.tar.bz2` / `.tbz2`, handed to the system `tar`
    TarBz2,
    /// `.tar`
    Tar,
    /// `.zip`
    Zip,
    /// Anything else: an installer or script copied as-is.
    Raw,
}

/// Detect source format from file extension
pub fn detect_format(path: &Path) -> SourceFormat {
    let path_str = path.to_string_lossy().to_lowercase();

    if path_str.ends_with(".tar.zst") || path_str.ends_with(".tzst") {
        SourceFormat::TarZst
    } else if path_str.ends_with(".tar.gz") || path_str.ends_with(".tgz") {
        SourceFormat::TarGz
    } else if path_str.ends_with(".tar.xz") || path_str.ends_with(".txz") {
        SourceFormat::TarXz
    } else if path_str.ends_with(".tar.bz2") || path_str.ends_with(".tbz2") {
        SourceFormat::TarBz2
    } else if path_str.ends_with(".tar") {
        SourceFormat::Tar
    } else if path_str.ends_with(".zip") {
        SourceFormat::Zip
    } else {
        SourceFormat::Raw
    }
}

/// Unpack one source into `dest_dir`, auto-detecting the format.
///
/// Raw files (installers like `STAR-CCM+12.02.010_01_linux-x86_64.bin`) are
/// copied into `dest_dir` with their permissions.
///
/// # Errors
///
/// Returns `ExtractError::Missing` if `source` does not exist, and
/// `ExtractError::Archive` or `ExtractError::Io` if it cannot be unpacked.
pub fn unpack(source: &Path, dest_dir: &Path) -> Result<(), ExtractError> {
    if !source.is_file() {
        return Err(ExtractError::Missing(source.to_path_buf()));
    }
    tracing::info!("unpacking {}", source.display());
    fs::create_dir_all(dest_dir)?;

    match detect_format(source) {
        SourceFormat::TarGz => {
            let reader = BufReader::new(File::open(source)?);
            extract_tar(flate2::read::GzDecoder::new(reader), dest_dir)
        }
        SourceFormat::TarZst => {
            let reader = BufReader::new(File::open(source)?);
            extract_tar(ZstdDecoder::new(reader)?, dest_dir)
        }
        SourceFormat::TarXz => {
            let reader = BufReader::new(File::open(source)?);
            extract_tar(liblzma::read::XzDecoder::new(reader), dest_dir)
        }
        SourceFormat::Tar => extract_tar(BufReader::new(File::open(source)?), dest_dir),
        SourceFormat::TarBz2 => extract_with_system_tar(source, dest_dir),
        SourceFormat::Zip => extract_zip(source, dest_dir),
        SourceFormat::Raw => copy(source, dest_dir),
    }
}

/// Copy one source into `dest_dir` without unpacking.
///
/// # Errors
///
/// Returns `ExtractError::Missing` if `source` does not exist.
pub fn copy(source: &Path, dest_dir: &Path) -> Result<(), ExtractError> {
    if !source.is_file() {
        return Err(ExtractError::Missing(source.to_path_buf()));
    }
    fs::create_dir_all(dest_dir)?;
    let filename = source
        .file_name()
        .ok_or_else(|| ExtractError::Archive("Invalid filename".to_string()))?;
    // fs::copy carries the permission bits, so installers stay executable.
    fs::copy(source, dest_dir.join(filename))?;
    Ok(())
}

/// Extract a tar archive from a reader
fn extract_tar<R: Read>(reader: R, dest_dir: &Path) -> Result<(), ExtractError> {
    let mut archive = tar::Archive::new(reader);
    archive.set_preserve_permissions(true);

    for entry in archive.entries()? {
        let mut entry = entry?;
        // unpack_in refuses entries that would escape dest_dir
        if !entry.unpack_in(dest_dir)? {
            return Err(ExtractError::Archive(format!(
                "Invalid path in archive: {}",
                entry.path()?.display()
            )));
        }
    }

    Ok(())
}

/// Extract a zip archive
fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<(), ExtractError> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file).map_err(|e| ExtractError::Archive(e.to_string()))?;

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| ExtractError::Archive(e.to_string()))?;
        let Some(relative_path) = file.enclosed_name() else {
            continue;
        };

        if file.is_dir() {
            fs::create_dir_all(dest_dir.join(&relative_path))?;
            continue;
        }

        let absolute_path = dest_dir.join(&relative_path);
        if let Some(p) = absolute_path.parent() {
            fs::create_dir_all(p)?;
        }

        let mut outfile = File::create(&absolute_path)?;
        io::copy(&mut file, &mut outfile)?;

        #[cfg(unix)]
        if let Some(mode) = file.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&absolute_path, fs::Permissions::from_mode(mode))?;
        }
    }

    Ok(())
}

/// Formats without a native decoder go through the system `tar`.
fn extract_with_system_tar(archive: &Path, dest_dir: &Path) -> Result<(), ExtractError> {
    let tar = which::which("tar")
        .map_err(|_| ExtractError::Archive("'tar' not found on PATH".to_string()))?;
    let output = Command::new(tar)
        .arg("-xf")
        .arg(archive)
        .arg("-C")
        .arg(dest_dir)
        .output()?;

    if !output.status.success() {
        return Err(ExtractError::Archive(format!(
            "Failed to extract {}: {}",
            archive.display(),
            String::from_utf8_lossy(&output.stderr)
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_tar_gz(path: &Path, entries: &[(&str, &[u8], u32)]) {
        let file = File::create(path).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, data, mode) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(*mode);
            header.set_cksum();
            builder.append_data(&mut header, name, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format(Path::new("foo.tar.zst")), SourceFormat::TarZst);
        assert_eq!(detect_format(Path::new("foo.tar.gz")), SourceFormat::TarGz);
        assert_eq!(detect_format(Path::new("foo.tgz")), SourceFormat::TarGz);
        assert_eq!(detect_format(Path::new("ghc.tar.xz")), SourceFormat::TarXz);
        assert_eq!(detect_format(Path::new("ghc.tar.bz2")), SourceFormat::TarBz2);
        assert_eq!(detect_format(Path::new("archive.tar")), SourceFormat::Tar);
        assert_eq!(detect_format(Path::new("BAZ.ZIP")), SourceFormat::Zip);
        assert_eq!(
            detect_format(Path::new("STAR-CCM+12.02.010_linux-x86_64.bin")),
            SourceFormat::Raw
        );
    }

    #[test]
    fn test_unpack_keeps_top_level_dir() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("CST-2019.05.tar.gz");
        write_tar_gz(
            &archive,
            &[
                ("CST-2019.05/install.sh", b"#!/bin/sh\n", 0o755),
                ("CST-2019.05/cst.patch", b"", 0o644),
            ],
        );

        let dest = dir.path().join("build");
        unpack(&archive, &dest).unwrap();

        let script = dest.join("CST-2019.05/install.sh");
        assert!(script.is_file());
        assert!(dest.join("CST-2019.05/cst.patch").is_file());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&script).unwrap().permissions().mode();
            assert!(mode & 0o111 != 0);
        }
    }

    #[test]
    fn test_unpack_raw_installer_copies() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("STAR-CCM+12.02.010_linux.bin");
        fs::write(&src, b"#!/bin/sh\nexit 0\n").unwrap();

        let dest = dir.path().join("build");
        unpack(&src, &dest).unwrap();
        assert!(dest.join("STAR-CCM+12.02.010_linux.bin").is_file());
    }

    #[test]
    fn test_copy_does_not_unpack() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("bundle.tar.gz");
        write_tar_gz(&archive, &[("bundle/file", b"x", 0o644)]);

        let dest = dir.path().join("build");
        copy(&archive, &dest).unwrap();
        assert!(dest.join("bundle.tar.gz").is_file());
        assert!(!dest.join("bundle").exists());
    }

    #[test]
    fn test_missing_source() {
        let dir = tempdir().unwrap();
        let result = unpack(&dir.path().join("nope.tar.gz"), dir.path());
        assert!(matches!(result, Err(ExtractError::Missing(_))));
    }
}
