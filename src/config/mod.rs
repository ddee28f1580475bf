//! Configuration loading, parsing, and validation for scriptorium.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Deep merging in [`merger`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use scriptorium::config::{load_merged_config, validate};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let dir = temp.path().join(".scriptorium");
//! fs::create_dir_all(&dir).unwrap();
//! fs::write(
//!     dir.join("config.yml"),
//!     "categories:\n  - name: Tools\n    scripts:\n      - { name: hello, path: hello.py }\n",
//! )
//! .unwrap();
//!
//! let config = load_merged_config(temp.path()).unwrap();
//! validate(&config).unwrap();
//! assert_eq!(config.categories[0].scripts[0].name, "hello");
//! ```
//!
//! # Configuration File Locations
//!
//! Discovered and merged in this order:
//! 1. User global config (`~/.scriptorium/config.yml`)
//! 2. Project config (`.scriptorium/config.yml`)
//! 3. Local overrides (`.scriptorium/config.local.yml`)

pub mod loader;
pub mod merger;
pub mod schema;
pub mod validator;

pub use schema::{
    CategoryConfig, KeyPolicy, OutputMode, ScriptConfig, ScriptoriumConfig, Settings,
};

pub use loader::{
    find_project_root, load_config, load_config_file, load_config_value, load_merged_config,
    parse_config, ConfigPaths, CONFIG_DIR,
};

pub use merger::{deep_merge, merge_configs};

pub use validator::{validate, validate_config, Severity, ValidationError};
