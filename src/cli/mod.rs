//! Command-line interface for Upkeep.
//!
//! This module provides the CLI argument parsing using clap's derive macros
//! and command implementations.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations
//! - [`context`] - Configuration and state shared by commands

pub mod args;
pub mod commands;
pub mod context;

pub use args::{
    ApplyArgs, CheckArgs, Cli, Commands, CompletionsArgs, InstallArgs, LogArgs, RegistryCommand,
    ReinstallArgs, TokenCommand,
};
pub use commands::{Command, CommandDispatcher, CommandResult};
pub use context::{AgentContext, ContextOptions};
