//! Child process construction and platform detection.

pub mod command;
pub mod platform;

pub use command::{
    execute_check, execute_quiet, spawn_merged, CommandResult, CommandSpec, INTERPRETER_ENV,
};
pub use platform::{default_interpreter, is_ci};
