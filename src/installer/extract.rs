//! Archive extraction.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Result, UpkeepError};

/// Extract a zip archive into `dest`.
///
/// The built-in reader is tried first; if it fails the partial output is
/// discarded and the system `unzip` is tried. Both failing yields
/// [`UpkeepError::ExtractFailed`] carrying both reasons.
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<()> {
    extract_using(archive, dest, extract_with_reader)
}

type Extractor = fn(&Path, &Path) -> std::result::Result<(), String>;

fn extract_using(archive: &Path, dest: &Path, primary: Extractor) -> Result<()> {
    fs::create_dir_all(dest)?;

    let primary = match primary(archive, dest) {
        Ok(()) => {
            tracing::debug!("Extracted {} to {}", archive.display(), dest.display());
            return Ok(());
        }
        Err(e) => e,
    };

    tracing::warn!(
        "Extraction of {} failed ({}), trying unzip",
        archive.display(),
        primary
    );
    reset_dir(dest)?;

    match extract_with_unzip(archive, dest) {
        Ok(()) => {
            tracing::debug!("Extracted {} with unzip", archive.display());
            Ok(())
        }
        Err(fallback) => {
            let _ = reset_dir(dest);
            Err(UpkeepError::ExtractFailed {
                message: format!("{}; fallback: {}", primary, fallback),
            })
        }
    }
}

fn extract_with_reader(archive: &Path, dest: &Path) -> std::result::Result<(), String> {
    let file = File::open(archive).map_err(|e| e.to_string())?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| e.to_string())?;
    zip.extract(dest).map_err(|e| e.to_string())
}

fn extract_with_unzip(archive: &Path, dest: &Path) -> std::result::Result<(), String> {
    let output = Command::new("unzip")
        .arg("-q")
        .arg("-o")
        .arg(archive)
        .arg("-d")
        .arg(dest)
        .output()
        .map_err(|e| format!("could not run unzip: {}", e))?;

    if output.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(format!("unzip exited with {}: {}", output.status, stderr.trim()))
    }
}

fn reset_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)?;
    Ok(())
}

/// Find the single wrapping directory of an extracted archive.
///
/// Plain files at the top level are ignored. When several directories are
/// present the lexicographically first is chosen.
pub fn find_top_level_dir(extracted: &Path) -> Result<PathBuf> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(extracted)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();

    if dirs.len() > 1 {
        tracing::warn!(
            "Archive has {} top-level folders, using {}",
            dirs.len(),
            dirs[0].display()
        );
    }

    dirs.into_iter().next().ok_or(UpkeepError::EmptyArchive)
}
