//! Command-line interface for scriptorium.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{CheckArgs, Cli, Commands, InstallArgs, ListArgs, RunArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};
