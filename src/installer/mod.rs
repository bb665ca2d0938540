//! Archive installation.
//!
//! [`ArchiveInstaller::install`] downloads the archive for a ref into a
//! private scratch directory, extracts it there, and moves its single
//! wrapping folder to `<install_root>/<target_name>`. Nothing becomes
//! visible at the target until the final move. On success the component is
//! upserted into the registry.

pub mod extract;
pub mod placement;

pub use extract::{extract_archive, find_top_level_dir};
pub use placement::{copy_dir, place_directory};

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::{ErrorKind, Result, UpkeepError};
use crate::registry::{ComponentRegistry, TrackedComponent, UpsertOutcome};
use crate::remote::{RemoteClient, RemoteSource};
use crate::resolver::StrategyKind;

/// What to install and where.
#[derive(Debug, Clone)]
pub struct InstallRequest {
    pub source: RemoteSource,
    /// Ref whose archive is downloaded (branch, tag or commit).
    pub git_ref: String,
    /// Branch recorded in the registry.
    pub branch: Option<String>,
    /// Directory name under the install root.
    pub target_name: String,
    /// Registry name; defaults to `target_name`.
    pub name: Option<String>,
    pub overwrite: bool,
    /// Identifier to record as installed, when already known.
    pub identifier: Option<String>,
    pub strategy: Option<StrategyKind>,
    pub entry_file: Option<String>,
}

impl InstallRequest {
    pub fn new(
        source: RemoteSource,
        git_ref: impl Into<String>,
        target_name: impl Into<String>,
    ) -> Self {
        Self {
            source,
            git_ref: git_ref.into(),
            branch: None,
            target_name: target_name.into(),
            name: None,
            overwrite: false,
            identifier: None,
            strategy: None,
            entry_file: None,
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name the component is registered under.
    pub fn registry_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.target_name)
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn with_strategy(mut self, strategy: Option<StrategyKind>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_entry_file(mut self, entry_file: Option<String>) -> Self {
        self.entry_file = entry_file;
        self
    }
}

/// Outcome of one install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallResult {
    pub success: bool,
    pub error_kind: Option<ErrorKind>,
    /// Human-readable outcome; the specific error message on failure.
    pub message: String,
    pub installed_path: PathBuf,
}

impl InstallResult {
    pub(crate) fn succeeded(path: PathBuf) -> Self {
        Self {
            success: true,
            error_kind: None,
            message: format!("Installed to {}", path.display()),
            installed_path: path,
        }
    }

    pub(crate) fn failed(error: &UpkeepError, path: PathBuf) -> Self {
        Self {
            success: false,
            error_kind: Some(error.kind()),
            message: error.to_string(),
            installed_path: path,
        }
    }
}

/// Downloads, extracts and places component archives.
pub struct ArchiveInstaller<'a> {
    client: &'a RemoteClient,
    install_root: PathBuf,
}

impl<'a> ArchiveInstaller<'a> {
    pub fn new(client: &'a RemoteClient, install_root: impl Into<PathBuf>) -> Self {
        Self {
            client,
            install_root: install_root.into(),
        }
    }

    pub fn install_root(&self) -> &Path {
        &self.install_root
    }

    /// Install a component and record it in `registry`.
    ///
    /// Never panics or propagates: every failure is reported through the
    /// returned [`InstallResult`].
    pub fn install(
        &self,
        request: &InstallRequest,
        registry: &mut ComponentRegistry,
    ) -> InstallResult {
        let target = self.install_root.join(&request.target_name);
        tracing::info!(
            "Installing {}@{} into {}",
            request.source,
            request.git_ref,
            target.display()
        );

        match self.install_files(request, &target) {
            Ok(()) => {
                let mut entry =
                    TrackedComponent::new(request.registry_name(), request.source.clone());
                if let Some(branch) = &request.branch {
                    entry = entry.with_branch(branch);
                }
                if let Some(identifier) = &request.identifier {
                    entry = entry.with_version(identifier);
                }
                if let Some(strategy) = request.strategy {
                    entry = entry.with_strategy(strategy);
                }
                if let Some(entry_file) = &request.entry_file {
                    entry = entry.with_entry_file(entry_file);
                }
                match registry.upsert(entry) {
                    UpsertOutcome::Rejected => tracing::warn!(
                        "Installed {} but left it untracked: no component name",
                        request.source
                    ),
                    outcome => {
                        tracing::debug!("Registry {:?} for {}", outcome, request.registry_name())
                    }
                }
                tracing::info!("Installed {} at {}", request.source, target.display());
                InstallResult::succeeded(target)
            }
            Err(e) => {
                tracing::error!(
                    "Install of {}@{} into {} failed: {}",
                    request.source,
                    request.git_ref,
                    target.display(),
                    e
                );
                InstallResult::failed(&e, target)
            }
        }
    }

    fn install_files(&self, request: &InstallRequest, target: &Path) -> Result<()> {
        validate_target_name(&request.target_name)?;

        if target.exists() && !request.overwrite {
            return Err(UpkeepError::AlreadyExists {
                path: target.to_path_buf(),
            });
        }

        // Dropped on every path, removing the download and extraction.
        let scratch = tempfile::Builder::new().prefix("upkeep-").tempdir()?;
        let archive = scratch.path().join("archive.zip");
        let extracted = scratch.path().join("extract");

        self.client
            .download_archive(&request.source, &request.git_ref, &archive)?;
        extract_archive(&archive, &extracted)?;
        let root = find_top_level_dir(&extracted)?;
        tracing::debug!("Archive root is {}", root.display());

        place_directory(&root, target, request.overwrite)
    }
}

fn validate_target_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\');
    if valid {
        Ok(())
    } else {
        Err(UpkeepError::ConfigValidationError {
            message: format!("invalid install folder name '{}'", name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::fs;
    use std::io::{Cursor, Write};
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn zip_bytes(entries: &[(&str, Option<&str>)]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, body) in entries {
            match body {
                None => zip.add_directory(*name, options).unwrap(),
                Some(body) => {
                    zip.start_file(*name, options).unwrap();
                    zip.write_all(body.as_bytes()).unwrap();
                }
            }
        }
        zip.finish().unwrap().into_inner()
    }

    fn widget_zip() -> Vec<u8> {
        zip_bytes(&[
            ("acme-widget-def5678/", None),
            ("acme-widget-def5678/widget.php", Some("Version: 1.0.3\n")),
        ])
    }

    fn source() -> RemoteSource {
        RemoteSource::parse("acme/widget").unwrap()
    }

    #[test]
    fn installs_and_registers_component() {
        let server = MockServer::start();
        let download = server.mock(|when, then| {
            when.method(GET).path("/repos/acme/widget/zipball/main");
            then.status(200).body(widget_zip());
        });
        let client = RemoteClient::new(&server.base_url(), None).unwrap();
        let root = TempDir::new().unwrap();
        let installer = ArchiveInstaller::new(&client, root.path());
        let mut registry = ComponentRegistry::default();

        let request = InstallRequest::new(source(), "main", "widget").with_branch("main");
        let result = installer.install(&request, &mut registry);

        assert!(result.success, "{}", result.message);
        assert_eq!(result.error_kind, None);
        assert_eq!(
            fs::read_to_string(root.path().join("widget/widget.php")).unwrap(),
            "Version: 1.0.3\n"
        );
        let entry = registry.get("widget").unwrap();
        assert_eq!(entry.branch.as_deref(), Some("main"));
        assert!(entry.last_known_version.is_empty());
        download.assert();
    }

    #[test]
    fn reinstall_does_not_duplicate_registry_entry() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/repos/acme/widget/zipball/def5678");
            then.status(200).body(widget_zip());
        });
        let client = RemoteClient::new(&server.base_url(), None).unwrap();
        let root = TempDir::new().unwrap();
        let installer = ArchiveInstaller::new(&client, root.path());
        let mut registry = ComponentRegistry::default();

        let request = InstallRequest::new(source(), "def5678", "widget")
            .with_overwrite(true)
            .with_identifier("def5678");
        assert!(installer.install(&request, &mut registry).success);
        assert!(installer.install(&request, &mut registry).success);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("widget").unwrap().last_known_version, "def5678");
    }

    #[test]
    fn existing_target_fails_twice_without_network() {
        let server = MockServer::start();
        let download = server.mock(|when, then| {
            when.method(GET).path("/repos/acme/widget/zipball/main");
            then.status(200).body(widget_zip());
        });
        let client = RemoteClient::new(&server.base_url(), None).unwrap();
        let root = TempDir::new().unwrap();
        fs::create_dir(root.path().join("widget")).unwrap();
        fs::write(root.path().join("widget/keep.txt"), "local").unwrap();
        let installer = ArchiveInstaller::new(&client, root.path());
        let mut registry = ComponentRegistry::default();

        let request = InstallRequest::new(source(), "main", "widget");
        for _ in 0..2 {
            let result = installer.install(&request, &mut registry);
            assert!(!result.success);
            assert_eq!(result.error_kind, Some(ErrorKind::AlreadyExists));
        }

        assert_eq!(
            fs::read_to_string(root.path().join("widget/keep.txt")).unwrap(),
            "local"
        );
        assert!(registry.is_empty());
        download.assert_calls(0);
    }

    #[test]
    fn archive_without_folder_is_empty_archive() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/repos/acme/widget/zipball/main");
            then.status(200)
                .body(zip_bytes(&[("README.md", Some("no wrapper"))]));
        });
        let client = RemoteClient::new(&server.base_url(), None).unwrap();
        let root = TempDir::new().unwrap();
        let installer = ArchiveInstaller::new(&client, root.path());
        let mut registry = ComponentRegistry::default();

        let result = installer.install(&InstallRequest::new(source(), "main", "widget"), &mut registry);

        assert_eq!(result.error_kind, Some(ErrorKind::EmptyArchive));
        assert!(!root.path().join("widget").exists());
        assert!(registry.is_empty());
    }

    #[test]
    fn download_failure_leaves_target_absent() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/repos/acme/widget/zipball/main");
            then.status(500);
        });
        let client = RemoteClient::new(&server.base_url(), None).unwrap();
        let root = TempDir::new().unwrap();
        let installer = ArchiveInstaller::new(&client, root.path());
        let mut registry = ComponentRegistry::default();

        let result = installer.install(&InstallRequest::new(source(), "main", "widget"), &mut registry);

        assert_eq!(result.error_kind, Some(ErrorKind::DownloadFailed));
        assert!(result.message.contains("zipball/main"));
        assert!(!root.path().join("widget").exists());
    }

    #[test]
    fn corrupt_archive_is_extract_failed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/repos/acme/widget/zipball/main");
            then.status(200).body("definitely not a zip");
        });
        let client = RemoteClient::new(&server.base_url(), None).unwrap();
        let root = TempDir::new().unwrap();
        let installer = ArchiveInstaller::new(&client, root.path());
        let mut registry = ComponentRegistry::default();

        let result = installer.install(&InstallRequest::new(source(), "main", "widget"), &mut registry);

        assert_eq!(result.error_kind, Some(ErrorKind::ExtractFailed));
        assert!(!root.path().join("widget").exists());
    }

    #[test]
    fn rejects_path_like_target_names() {
        assert!(validate_target_name("widget").is_ok());
        assert!(validate_target_name("").is_err());
        assert!(validate_target_name("..").is_err());
        assert!(validate_target_name("a/b").is_err());
    }
}
