//! Script dependency discovery, probing and installation.
//!
//! # Modules
//!
//! - [`scanner`] - Static import scanning of script source
//! - [`declaration`] - In-file `requirements:` declarations
//! - [`registry`] - Module → package aliases and the stdlib ignore list
//! - [`probe`] - Interpreter queries for installed packages and runtime modules
//! - [`checker`] - Classification of a script into missing packages
//! - [`installer`] - Background install batches
//! - [`status`] - Result types

pub mod checker;
pub mod declaration;
pub mod installer;
pub mod probe;
pub mod registry;
pub mod scanner;
pub mod status;

pub use checker::DependencyClassifier;
pub use declaration::DeclarationRule;
pub use installer::{confirm_install, InstallCoordinator};
pub use probe::{InterpreterProbe, ModuleProbe, PackageProbe};
pub use registry::PackageRegistry;
pub use scanner::{scan_imports, ScanError};
pub use status::{DependencySet, MissingPackageList};
