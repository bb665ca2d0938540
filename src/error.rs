//! Error types for Upkeep operations.
//!
//! This module defines [`UpkeepError`], the primary error type used throughout
//! the crate, the [`ErrorKind`] taxonomy it maps onto, and a [`Result`] alias.
//!
//! # Error Handling Strategy
//!
//! - Remote failures are `Unavailable` or `NotFound` and mean "skip this
//!   component for this cycle", never "abort the cycle"
//! - Installer failures carry a distinct kind so callers can render the
//!   specific reason instead of a generic failure
//! - Use `anyhow::Error` (via `UpkeepError::Other`) for unexpected errors

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for Upkeep operations.
#[derive(Debug, Error)]
pub enum UpkeepError {
    /// Remote fetch failed or returned data that could not be parsed.
    #[error("Remote unavailable: {message}")]
    Unavailable { message: String },

    /// Remote entity does not exist at the given ref.
    #[error("Not found: {what}")]
    NotFound { what: String },

    /// Target install path is occupied and overwrite was not requested.
    #[error("Target folder already exists: {}", path.display())]
    AlreadyExists { path: PathBuf },

    /// Archive download failed.
    #[error("Download failed for {url}: {message}")]
    DownloadFailed { url: String, message: String },

    /// Both the primary and the fallback extraction failed.
    #[error("Could not extract archive: {message}")]
    ExtractFailed { message: String },

    /// Extraction produced no top-level directory.
    #[error("No folder found in archive")]
    EmptyArchive,

    /// Neither rename nor copy could place the new content at the target.
    #[error("Could not move component to {}: {message}", target.display())]
    MoveFailed { target: PathBuf, message: String },

    /// Configuration file not found at expected location.
    #[error("Configuration not found: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse a configuration or state file.
    #[error("Failed to parse {}: {message}", path.display())]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// No registry entry with this name.
    #[error("Unknown component: {name}")]
    UnknownComponent { name: String },

    /// Repository identifier is not of the form `owner/repo`.
    #[error("Invalid repository '{input}': expected owner/repo")]
    InvalidRemoteSource { input: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Classification of failures, independent of their payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Unavailable,
    NotFound,
    AlreadyExists,
    DownloadFailed,
    ExtractFailed,
    EmptyArchive,
    MoveFailed,
    Config,
    Io,
    Other,
}

impl ErrorKind {
    /// Short machine-friendly name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::NotFound => "not_found",
            ErrorKind::AlreadyExists => "already_exists",
            ErrorKind::DownloadFailed => "download_failed",
            ErrorKind::ExtractFailed => "extract_failed",
            ErrorKind::EmptyArchive => "empty_archive",
            ErrorKind::MoveFailed => "move_failed",
            ErrorKind::Config => "config",
            ErrorKind::Io => "io",
            ErrorKind::Other => "other",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl UpkeepError {
    /// The taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            UpkeepError::Unavailable { .. } => ErrorKind::Unavailable,
            UpkeepError::NotFound { .. } => ErrorKind::NotFound,
            UpkeepError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            UpkeepError::DownloadFailed { .. } => ErrorKind::DownloadFailed,
            UpkeepError::ExtractFailed { .. } => ErrorKind::ExtractFailed,
            UpkeepError::EmptyArchive => ErrorKind::EmptyArchive,
            UpkeepError::MoveFailed { .. } => ErrorKind::MoveFailed,
            UpkeepError::ConfigNotFound { .. }
            | UpkeepError::ConfigParseError { .. }
            | UpkeepError::ConfigValidationError { .. }
            | UpkeepError::UnknownComponent { .. }
            | UpkeepError::InvalidRemoteSource { .. } => ErrorKind::Config,
            UpkeepError::Io(_) => ErrorKind::Io,
            UpkeepError::Other(_) => ErrorKind::Other,
        }
    }

    /// Shorthand for an `Unavailable` error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        UpkeepError::Unavailable {
            message: message.into(),
        }
    }

    /// Shorthand for a `NotFound` error.
    pub fn not_found(what: impl Into<String>) -> Self {
        UpkeepError::NotFound { what: what.into() }
    }
}

/// Result type alias for Upkeep operations.
pub type Result<T> = std::result::Result<T, UpkeepError>;
