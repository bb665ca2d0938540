//! Moving extracted content into its final location.
//!
//! A rename is attempted first. When it fails (typically because the scratch
//! directory lives on another filesystem) the content is copied into a
//! staging directory next to the target and that directory is renamed into
//! place. An existing target is parked beside the target until the new
//! content is in place, and restored if placement fails.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Result, UpkeepError};

/// Place `source` at `target`.
///
/// With `overwrite` an existing target is replaced as a whole; without it an
/// existing target fails with [`UpkeepError::AlreadyExists`].
pub fn place_directory(source: &Path, target: &Path, overwrite: bool) -> Result<()> {
    place_with(source, target, overwrite, |from, to| fs::rename(from, to))
}

fn place_with<R>(source: &Path, target: &Path, overwrite: bool, rename: R) -> Result<()>
where
    R: Fn(&Path, &Path) -> io::Result<()>,
{
    let move_failed = |message: String| UpkeepError::MoveFailed {
        target: target.to_path_buf(),
        message,
    };

    if target.exists() && !overwrite {
        return Err(UpkeepError::AlreadyExists {
            path: target.to_path_buf(),
        });
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| move_failed(e.to_string()))?;
    }

    let backup = if target.exists() {
        let backup = sibling(target, "old");
        fs::rename(target, &backup)
            .map_err(|e| move_failed(format!("could not move previous version aside: {}", e)))?;
        tracing::debug!("Parked previous version at {}", backup.display());
        Some(backup)
    } else {
        None
    };

    match move_into_place(source, target, rename) {
        Ok(()) => {
            if let Some(backup) = backup {
                if let Err(e) = fs::remove_dir_all(&backup) {
                    tracing::warn!("Could not remove {}: {}", backup.display(), e);
                }
            }
            Ok(())
        }
        Err(message) => {
            if let Some(backup) = backup {
                restore(&backup, target);
            }
            Err(move_failed(message))
        }
    }
}

fn move_into_place<R>(source: &Path, target: &Path, rename: R) -> std::result::Result<(), String>
where
    R: Fn(&Path, &Path) -> io::Result<()>,
{
    let rename_err = match rename(source, target) {
        Ok(()) => {
            tracing::debug!("Renamed {} to {}", source.display(), target.display());
            return Ok(());
        }
        Err(e) => e,
    };

    tracing::warn!(
        "Rename to {} failed ({}), falling back to copy",
        target.display(),
        rename_err
    );

    let staging = sibling(target, "new");
    let copied = copy_dir(source, &staging).and_then(|()| fs::rename(&staging, target));
    match copied {
        Ok(()) => {
            let _ = fs::remove_dir_all(source);
            Ok(())
        }
        Err(copy_err) => {
            let _ = fs::remove_dir_all(&staging);
            Err(format!("rename: {}; copy: {}", rename_err, copy_err))
        }
    }
}

fn restore(backup: &Path, target: &Path) {
    if target.exists() {
        let _ = fs::remove_dir_all(target);
    }
    match fs::rename(backup, target) {
        Ok(()) => tracing::info!("Restored previous version at {}", target.display()),
        Err(e) => tracing::error!(
            "Could not restore previous version from {}: {}",
            backup.display(),
            e
        ),
    }
}

/// Hidden path next to `target` used while swapping.
fn sibling(target: &Path, tag: &str) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{}.upkeep-{}-{}", name, tag, std::process::id()))
}

/// Recursively copy a directory tree.
pub fn copy_dir(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if entry.file_type()?.is_dir() {
            copy_dir(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture(root: &Path, name: &str, files: &[(&str, &str)]) -> PathBuf {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        for (file, body) in files {
            let path = dir.join(file);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, body).unwrap();
        }
        dir
    }

    #[test]
    fn places_into_empty_target() {
        let temp = TempDir::new().unwrap();
        let source = fixture(temp.path(), "src", &[("widget.php", "new")]);
        let target = temp.path().join("components").join("widget");

        place_directory(&source, &target, false).unwrap();

        assert_eq!(fs::read_to_string(target.join("widget.php")).unwrap(), "new");
        assert!(!source.exists());
    }

    #[test]
    fn existing_target_without_overwrite_is_untouched() {
        let temp = TempDir::new().unwrap();
        let source = fixture(temp.path(), "src", &[("widget.php", "new")]);
        let target = fixture(temp.path(), "widget", &[("widget.php", "old")]);

        let err = place_directory(&source, &target, false).unwrap_err();

        assert!(matches!(err, UpkeepError::AlreadyExists { .. }));
        assert_eq!(fs::read_to_string(target.join("widget.php")).unwrap(), "old");
        assert!(source.exists());
    }

    #[test]
    fn overwrite_replaces_whole_directory() {
        let temp = TempDir::new().unwrap();
        let source = fixture(temp.path(), "src", &[("widget.php", "new")]);
        let target = fixture(
            temp.path(),
            "widget",
            &[("widget.php", "old"), ("stale/notes.txt", "unrelated")],
        );

        place_directory(&source, &target, true).unwrap();

        assert_eq!(fs::read_to_string(target.join("widget.php")).unwrap(), "new");
        assert!(!target.join("stale").exists());
        let leftovers: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with('.'))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn failed_placement_restores_previous_version() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("does-not-exist");
        let target = fixture(temp.path(), "widget", &[("widget.php", "old")]);

        let err = place_directory(&missing, &target, true).unwrap_err();

        assert!(matches!(err, UpkeepError::MoveFailed { .. }));
        assert_eq!(fs::read_to_string(target.join("widget.php")).unwrap(), "old");
    }

    fn cross_device(_from: &Path, _to: &Path) -> io::Result<()> {
        Err(io::Error::other("Invalid cross-device link"))
    }

    fn hidden_entries(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with('.'))
            .collect()
    }

    #[test]
    fn copy_fallback_replaces_target_when_rename_fails() {
        let scratch = TempDir::new().unwrap();
        let install = TempDir::new().unwrap();
        let source = fixture(
            scratch.path(),
            "acme-widget-x",
            &[("widget.php", "new"), ("assets/app.js", "js")],
        );
        let target = fixture(
            install.path(),
            "widget",
            &[("widget.php", "old"), ("obsolete.txt", "gone")],
        );

        place_with(&source, &target, true, cross_device).unwrap();

        assert_eq!(fs::read_to_string(target.join("widget.php")).unwrap(), "new");
        assert_eq!(fs::read_to_string(target.join("assets/app.js")).unwrap(), "js");
        assert!(!target.join("obsolete.txt").exists());
        assert!(!source.exists());
        assert!(hidden_entries(install.path()).is_empty());
    }

    #[test]
    fn copy_fallback_places_into_empty_target() {
        let scratch = TempDir::new().unwrap();
        let install = TempDir::new().unwrap();
        let source = fixture(scratch.path(), "acme-widget-x", &[("widget.php", "new")]);
        let target = install.path().join("widget");

        place_with(&source, &target, false, cross_device).unwrap();

        assert_eq!(fs::read_to_string(target.join("widget.php")).unwrap(), "new");
        assert!(!source.exists());
        let entries: Vec<_> = fs::read_dir(install.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, ["widget"]);
    }

    #[test]
    fn copy_dir_copies_nested_tree() {
        let temp = TempDir::new().unwrap();
        let source = fixture(
            temp.path(),
            "src",
            &[("a.txt", "a"), ("nested/deeper/b.txt", "b")],
        );
        let dest = temp.path().join("dest");

        copy_dir(&source, &dest).unwrap();

        assert_eq!(fs::read_to_string(dest.join("a.txt")).unwrap(), "a");
        assert_eq!(
            fs::read_to_string(dest.join("nested/deeper/b.txt")).unwrap(),
            "b"
        );
    }
}
