//! End-to-end update flows through the public library API.

use httpmock::prelude::*;
use serde_json::json;
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;
use tempfile::TempDir;
use upkeep::error::ErrorKind;
use upkeep::host::{DirectoryUnits, InstalledUnits, UpdateTransient};
use upkeep::installer::ArchiveInstaller;
use upkeep::orchestrator::{CheckStatus, OrchestratorOptions, UpdateOrchestrator};
use upkeep::registry::TrackedComponent;
use upkeep::remote::{RemoteClient, RemoteSource};
use upkeep::resolver::StrategyKind;
use upkeep::state::StateStore;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn release_zip(version: &str) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    zip.add_directory("acme-gadget-v1/", options).unwrap();
    zip.start_file("acme-gadget-v1/gadget.php", options).unwrap();
    write!(zip, "<?php\n/*\nVersion: {}\n*/\n", version).unwrap();
    zip.start_file("acme-gadget-v1/assets/app.js", options)
        .unwrap();
    zip.write_all(b"console.log('gadget');\n").unwrap();
    zip.finish().unwrap().into_inner()
}

fn install_unit(root: &Path, version: &str) {
    let dir = root.join("gadget");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("gadget.php"), format!("Version: {}\n", version)).unwrap();
    fs::write(dir.join("obsolete.txt"), "left over").unwrap();
}

fn gadget_state(version: &str) -> StateStore {
    let mut state = StateStore::default();
    state.repos.upsert(
        TrackedComponent::new("gadget", RemoteSource::parse("acme/gadget").unwrap())
            .with_strategy(StrategyKind::Release)
            .with_version(version),
    );
    state
}

fn mock_release(server: &MockServer, tag: &str) {
    let tag = tag.to_string();
    server.mock(move |when, then| {
        when.method(GET).path("/repos/acme/gadget/releases/latest");
        then.status(200).json_body(json!({
            "tag_name": tag,
            "html_url": "https://github.com/acme/gadget/releases/latest",
            "assets": []
        }));
    });
}

#[test]
fn release_update_is_published_applied_and_recorded() {
    let server = MockServer::start();
    mock_release(&server, "v1.2.0");
    let download = server.mock(|when, then| {
        when.method(GET).path("/repos/acme/gadget/zipball/v1.2.0");
        then.status(200).body(release_zip("1.2.0"));
    });

    let root = TempDir::new().unwrap();
    install_unit(root.path(), "1.1.0");
    let units = DirectoryUnits::new(root.path());
    assert_eq!(units.locate("gadget").as_deref(), Some("gadget/gadget.php"));

    let client = RemoteClient::new(&server.base_url(), None).unwrap();
    let orchestrator = UpdateOrchestrator::new(
        &client,
        &units,
        ArchiveInstaller::new(&client, root.path()),
        OrchestratorOptions::default(),
    );
    let mut state = gadget_state("1.1.0");

    let report = orchestrator.run_cycle(&mut state);
    assert_eq!(
        report.checks[0].status,
        CheckStatus::UpdateAvailable {
            version: "1.2.0".to_string()
        }
    );
    let mut transient: UpdateTransient = report.transient;
    assert_eq!(transient.get("gadget/gadget.php").unwrap().archive_ref, "v1.2.0");
    download.assert_calls(0);

    let applied = orchestrator.apply(&mut state, &mut transient);

    assert_eq!(applied.len(), 1);
    assert!(applied[0].result.success, "{}", applied[0].result.message);
    assert_eq!(
        applied[0].completion.as_ref().unwrap().outcome,
        Ok("1.2.0".to_string())
    );
    assert!(transient.is_empty());
    assert_eq!(state.repos.get("gadget").unwrap().last_known_version, "1.2.0");

    let unit = root.path().join("gadget");
    assert!(fs::read_to_string(unit.join("gadget.php"))
        .unwrap()
        .contains("1.2.0"));
    assert!(unit.join("assets/app.js").exists());
    assert!(!unit.join("obsolete.txt").exists());

    // A second cycle finds nothing to do.
    let report = orchestrator.run_cycle(&mut state);
    assert!(report.candidates.is_empty());
    download.assert_calls(1);
}

#[test]
fn failed_reinstall_keeps_installed_copy() {
    let server = MockServer::start();
    mock_release(&server, "v1.2.0");
    server.mock(|when, then| {
        when.method(GET).path("/repos/acme/gadget/zipball/v1.2.0");
        then.status(404);
    });

    let root = TempDir::new().unwrap();
    install_unit(root.path(), "1.1.0");
    let units = DirectoryUnits::new(root.path());
    let client = RemoteClient::new(&server.base_url(), None).unwrap();
    let orchestrator = UpdateOrchestrator::new(
        &client,
        &units,
        ArchiveInstaller::new(&client, root.path()),
        OrchestratorOptions::default(),
    );
    let mut state = gadget_state("1.1.0");

    let result = orchestrator.force_reinstall(&mut state, "gadget", None).unwrap();

    assert!(!result.success);
    assert_eq!(result.error_kind, Some(ErrorKind::DownloadFailed));
    assert!(root.path().join("gadget/obsolete.txt").exists());
    assert_eq!(state.repos.get("gadget").unwrap().last_known_version, "1.1.0");
    assert!(state.debug_log.entries()[0].contains("reinstall failed"));
}

#[test]
fn host_install_completion_records_remote_version() {
    let server = MockServer::start();
    mock_release(&server, "2.0.0");

    let root = TempDir::new().unwrap();
    install_unit(root.path(), "2.0.0");
    let units = DirectoryUnits::new(root.path());
    let client = RemoteClient::new(&server.base_url(), None).unwrap();
    let orchestrator = UpdateOrchestrator::new(
        &client,
        &units,
        ArchiveInstaller::new(&client, root.path()),
        OrchestratorOptions::default(),
    );
    let mut state = gadget_state("1.1.0");

    let completed =
        orchestrator.complete_host_install(&mut state, &["gadget/gadget.php".to_string()]);

    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].component, "gadget");
    assert_eq!(state.repos.get("gadget").unwrap().last_known_version, "2.0.0");

    let unrelated = orchestrator.complete_host_install(&mut state, &["other/other.php".to_string()]);
    assert!(unrelated.is_empty());
}

#[test]
fn state_survives_a_round_trip_through_disk() {
    let state_dir = TempDir::new().unwrap();
    let mut state = gadget_state("1.1.0");
    state.debug_log.record("gadget: up to date (1.1.0)");
    state.set_token("ghp_example");
    state.save(state_dir.path()).unwrap();

    let loaded = StateStore::load(state_dir.path()).unwrap();
    assert_eq!(loaded, state);
    assert_eq!(
        loaded.repos.get("gadget").unwrap().strategy,
        Some(StrategyKind::Release)
    );
}
