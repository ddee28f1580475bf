//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results. Commands are
//! routed by [`CommandDispatcher`], which owns the project root and any
//! `--config` override so every command loads configuration the same way.

pub mod check;
pub mod context;
pub mod dispatcher;
pub mod install;
pub mod list;
pub mod run;

pub use context::ProjectContext;
pub use dispatcher::{Command, CommandDispatcher, CommandResult};
