//! Persistent agent state.
//!
//! This module provides the state file holding the component registry,
//! the bounded activity log and the stored access token.

pub mod log;
pub mod store;

pub use log::ActivityLog;
pub use store::{StateStore, TOKEN_ENV};
