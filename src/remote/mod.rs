//! Remote source access.
//!
//! This module talks to the repository hosting API:
//! - [`RemoteSource`] names a repository (`owner/repo`)
//! - [`RemoteClient`] reads file contents, releases, branch heads and archives
//! - [`Credential`] and [`HostPolicy`] control where the access token is sent
//!
//! # Example
//!
//! ```
//! use upkeep::remote::{RemoteClient, RemoteSource};
//!
//! let client = RemoteClient::new("https://api.github.com", None).unwrap();
//! let source = RemoteSource::parse("https://github.com/acme/widget.git").unwrap();
//! let url = client.resolve_archive_url(&source, "main").unwrap();
//! assert_eq!(url.as_str(), "https://api.github.com/repos/acme/widget/zipball/main");
//! ```

pub mod auth;
pub mod client;
pub mod payload;
pub mod source;

pub use auth::{Credential, HostPolicy};
pub use client::{ClientOptions, RemoteClient, DEFAULT_TRUSTED_HOSTS};
pub use payload::{short_sha, CommitId, FileContent, ReleaseAsset, ReleaseMetadata};
pub use source::RemoteSource;
