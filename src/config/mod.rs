//! Configuration loading, parsing, and validation for Upkeep.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use upkeep::config::{load_config, ConfigOverrides};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let path = temp.path().join("config.yml");
//! fs::write(&path, "default_branch: trunk\nstrategy: release\n").unwrap();
//!
//! let config = load_config(Some(&path), &ConfigOverrides::default()).unwrap();
//! assert_eq!(config.default_branch, "trunk");
//! ```

pub mod loader;
pub mod schema;
pub mod validator;

pub use loader::{
    discover_config, load_config, load_config_file, parse_config, ConfigOverrides, CONFIG_FILE,
};
pub use schema::{default_state_dir, UpkeepConfig};
pub use validator::{validate, validate_config, ValidationError};
