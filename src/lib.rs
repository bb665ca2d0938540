//! Upkeep - keep components installed from hosted repositories up to date.
//!
//! Upkeep tracks components installed from GitHub repositories, resolves
//! their latest remote version (version header, tagged release or head
//! commit), publishes update candidates and installs archives atomically.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading and validation
//! - [`error`] - Error types and result aliases
//! - [`host`] - Installed units and the published update list
//! - [`installer`] - Archive download, extraction and placement
//! - [`orchestrator`] - Check cycles, forced reinstall and post-install bookkeeping
//! - [`registry`] - Tracked component registry
//! - [`remote`] - Hosting API client
//! - [`resolver`] - Version strategies and comparison
//! - [`state`] - Persisted registry, activity log and token
//! - [`ui`] - Prompts, spinners, and terminal output
//!
//! # Example
//!
//! ```
//! use upkeep::resolver::{is_newer_version, RemoteVersion, StrategyKind, VersionStrategy};
//!
//! assert_eq!(is_newer_version("1.0.0", "1.0.3"), Ok(true));
//!
//! let head = RemoteVersion {
//!     identifier: "def5678".to_string(),
//!     archive_ref: "def5678".to_string(),
//! };
//! let commit = VersionStrategy::Commit;
//! assert_eq!(commit.kind(), StrategyKind::Commit);
//! assert_eq!(commit.is_update("abc1234", &head), Ok(true));
//! ```
//!
//! For network and filesystem flows, see the integration tests.

pub mod cli;
pub mod config;
pub mod error;
pub mod host;
pub mod installer;
pub mod orchestrator;
pub mod registry;
pub mod remote;
pub mod resolver;
pub mod state;
pub mod ui;

pub use error::{Result, UpkeepError};
