//! Installed unit discovery.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::resolver::extract_header_version;

/// Bytes of each candidate file inspected for a `Version:` header.
const HEADER_SCAN_BYTES: u64 = 8 * 1024;

/// Source of installed unit identifiers.
pub trait InstalledUnits {
    /// All installed unit identifiers (`dir` or `dir/entry`).
    fn units(&self) -> Vec<String>;

    /// Find the unit for a component name.
    ///
    /// An exact identifier match wins; otherwise the first unit whose
    /// identifier starts with `name/`.
    fn locate(&self, name: &str) -> Option<String> {
        let units = self.units();
        if let Some(exact) = units.iter().find(|u| u.as_str() == name) {
            return Some(exact.clone());
        }
        let prefix = format!("{}/", name.trim_end_matches('/'));
        units.into_iter().find(|u| u.starts_with(&prefix))
    }
}

impl InstalledUnits for Vec<String> {
    fn units(&self) -> Vec<String> {
        self.clone()
    }
}

/// Units are the immediate subdirectories of an install root.
#[derive(Debug, Clone)]
pub struct DirectoryUnits {
    root: PathBuf,
}

impl DirectoryUnits {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Identifier for one unit directory.
    fn unit_id(dir: &Path, dir_name: &str) -> String {
        match entry_file(dir) {
            Some(entry) => format!("{}/{}", dir_name, entry),
            None => dir_name.to_string(),
        }
    }
}

impl InstalledUnits for DirectoryUnits {
    fn units(&self) -> Vec<String> {
        let read = match fs::read_dir(&self.root) {
            Ok(read) => read,
            Err(e) => {
                tracing::debug!("Cannot read install root {}: {}", self.root.display(), e);
                return Vec::new();
            }
        };

        let mut dirs: Vec<(String, PathBuf)> = read
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .filter_map(|entry| {
                let name = entry.file_name().to_str()?.to_string();
                (!name.starts_with('.')).then(|| (name, entry.path()))
            })
            .collect();
        dirs.sort();

        dirs.iter()
            .map(|(name, path)| Self::unit_id(path, name))
            .collect()
    }
}

/// First file (by name) directly inside `dir` with a `Version:` header.
fn entry_file(dir: &Path) -> Option<String> {
    let mut files: Vec<(String, PathBuf)> = fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|entry| Some((entry.file_name().to_str()?.to_string(), entry.path())))
        .collect();
    files.sort();

    files
        .into_iter()
        .find(|(_, path)| has_version_header(path))
        .map(|(name, _)| name)
}

fn has_version_header(path: &Path) -> bool {
    let mut head = Vec::new();
    let read = File::open(path).and_then(|f| f.take(HEADER_SCAN_BYTES).read_to_end(&mut head));
    if read.is_err() {
        return false;
    }
    extract_header_version(&String::from_utf8_lossy(&head)).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn unit(root: &Path, dir: &str, files: &[(&str, &str)]) {
        let path = root.join(dir);
        fs::create_dir_all(&path).unwrap();
        for (name, body) in files {
            fs::write(path.join(name), body).unwrap();
        }
    }

    #[test]
    fn identifies_units_by_entry_file() {
        let temp = TempDir::new().unwrap();
        unit(
            temp.path(),
            "widget",
            &[("README.md", "docs"), ("widget.php", "<?php\n/* Version: 1.0.0 */")],
        );
        unit(temp.path(), "gadget", &[("notes.txt", "no header")]);
        fs::write(temp.path().join("loose.txt"), "ignored").unwrap();

        let units = DirectoryUnits::new(temp.path()).units();
        assert_eq!(units, vec!["gadget".to_string(), "widget/widget.php".to_string()]);
    }

    #[test]
    fn first_matching_file_wins() {
        let temp = TempDir::new().unwrap();
        unit(
            temp.path(),
            "widget",
            &[("b.php", "Version: 2.0.0"), ("a.php", "Version: 1.0.0")],
        );

        let units = DirectoryUnits::new(temp.path()).units();
        assert_eq!(units, vec!["widget/a.php".to_string()]);
    }

    #[test]
    fn missing_root_has_no_units() {
        let temp = TempDir::new().unwrap();
        let units = DirectoryUnits::new(temp.path().join("absent")).units();
        assert!(units.is_empty());
    }

    #[test]
    fn locate_prefers_exact_match() {
        let units = vec!["widget".to_string(), "widget/widget.php".to_string()];
        assert_eq!(units.locate("widget").as_deref(), Some("widget"));
    }

    #[test]
    fn locate_falls_back_to_prefix_scan() {
        let units = vec!["gadget/main.php".to_string(), "widget/widget.php".to_string()];
        assert_eq!(units.locate("widget").as_deref(), Some("widget/widget.php"));
        assert_eq!(
            units.locate("widget/widget.php").as_deref(),
            Some("widget/widget.php")
        );
        assert_eq!(units.locate("wid"), None);
    }
}
