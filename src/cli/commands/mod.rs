//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. Commands that touch state load
//! it through [`AgentContext`](crate::cli::context::AgentContext) and save
//! it before returning.

pub mod apply;
pub mod check;
pub mod completions;
pub mod dispatcher;
pub mod install;
pub mod log;
pub mod registry;
pub mod reinstall;
pub mod token;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
