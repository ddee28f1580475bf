//! Scriptorium - run categorized scripts, installing what they import.
//!
//! Scripts are listed by category in YAML configuration. Before a script
//! runs, its imports and in-file `requirements:` declaration are checked
//! against the interpreter; anything missing is installed (after asking)
//! and the script is started as a supervised child process whose output,
//! status and input are relayed through a [`ui::UserInterface`].
//!
//! # Modules
//!
//! - [`catalog`] - Categorized scripts and supervision keys
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, merging, and validation
//! - [`error`] - Error types and result aliases
//! - [`requirements`] - Import scanning, probing, and package installation
//! - [`runner`] - Orchestration of check, install and launch
//! - [`shell`] - Child process construction and platform detection
//! - [`supervisor`] - Running scripts, their output and their status
//! - [`ui`] - Prompts and terminal output
//!
//! # Example
//!
//! ```
//! use scriptorium::requirements::scan_imports;
//!
//! let modules = scan_imports("import os\nfrom requests import get\n").unwrap();
//! assert!(modules.contains("requests"));
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod requirements;
pub mod runner;
pub mod shell;
pub mod supervisor;
pub mod ui;

pub use error::{Result, ScriptoriumError};
