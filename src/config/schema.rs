//! Configuration schema definitions for scriptorium.
//!
//! This module contains the struct definitions that map to the YAML
//! configuration file format.

use crate::requirements::declaration::{DEFAULT_MARKER, DEFAULT_SCAN_LINES};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Root configuration structure for `.scriptorium/config.yml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptoriumConfig {
    /// Global settings
    pub settings: Settings,

    /// Project-specific module → package aliases, layered over the builtins
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub aliases: HashMap<String, String>,

    /// Script catalog, in display order
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
}

/// Global settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Interpreter used for scripts, probes and the default installer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<String>,

    /// Installer command prefix; packages are appended to it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_command: Option<Vec<String>>,

    /// Marker that introduces the in-file dependency declaration
    #[serde(default = "default_marker")]
    pub declaration_marker: String,

    /// How many leading lines are searched for the marker
    #[serde(default = "default_scan_lines")]
    pub declaration_scan_lines: usize,

    /// Upper bound on the wait after killing a script
    #[serde(default = "default_stop_timeout_ms")]
    pub stop_timeout_ms: u64,

    /// How supervision keys are derived from catalog entries
    #[serde(default)]
    pub key_policy: KeyPolicy,

    /// Default output mode: verbose, quiet, silent
    #[serde(default)]
    pub default_output: OutputMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            interpreter: None,
            install_command: None,
            declaration_marker: default_marker(),
            declaration_scan_lines: default_scan_lines(),
            stop_timeout_ms: default_stop_timeout_ms(),
            key_policy: KeyPolicy::default(),
            default_output: OutputMode::default(),
        }
    }
}

fn default_marker() -> String {
    DEFAULT_MARKER.to_string()
}

fn default_scan_lines() -> usize {
    DEFAULT_SCAN_LINES
}

fn default_stop_timeout_ms() -> u64 {
    1000
}

/// Output verbosity mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Verbose,
    Quiet,
    Silent,
}

/// Supervision key derivation.
///
/// `name` keys processes by script name alone, so two scripts sharing a
/// name in different categories share one process slot. `qualified` keys by
/// `category/name`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyPolicy {
    #[default]
    Name,
    Qualified,
}

/// A named group of scripts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryConfig {
    /// Category name (display)
    pub name: String,

    /// Scripts in this category
    pub scripts: Vec<ScriptConfig>,
}

/// One catalog entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    /// Script name (display and lookup)
    pub name: String,

    /// Path to the script, relative to the project root unless absolute
    pub path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_uses_defaults() {
        let config: ScriptoriumConfig = serde_yaml::from_str("{}").unwrap();
        assert!(config.categories.is_empty());
        assert_eq!(config.settings.declaration_marker, "requirements:");
        assert_eq!(config.settings.declaration_scan_lines, 15);
        assert_eq!(config.settings.stop_timeout_ms, 1000);
        assert_eq!(config.settings.key_policy, KeyPolicy::Name);
        assert_eq!(config.settings.default_output, OutputMode::Verbose);
    }

    #[test]
    fn parses_full_config() {
        let yaml = r#"
settings:
  interpreter: /opt/py/bin/python
  install_command: [uv, pip, install]
  declaration_marker: "deps:"
  declaration_scan_lines: 5
  stop_timeout_ms: 250
  key_policy: qualified
  default_output: quiet
aliases:
  cv2: opencv-python-headless
categories:
  - name: Utilities
    scripts:
      - name: hello
        path: scripts/hello.py
"#;
        let config: ScriptoriumConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.settings.interpreter.as_deref(), Some("/opt/py/bin/python"));
        assert_eq!(
            config.settings.install_command,
            Some(vec!["uv".to_string(), "pip".to_string(), "install".to_string()])
        );
        assert_eq!(config.settings.key_policy, KeyPolicy::Qualified);
        assert_eq!(config.settings.default_output, OutputMode::Quiet);
        assert_eq!(config.aliases["cv2"], "opencv-python-headless");
        assert_eq!(config.categories[0].scripts[0].name, "hello");
        assert_eq!(
            config.categories[0].scripts[0].path,
            PathBuf::from("scripts/hello.py")
        );
    }

    #[test]
    fn unknown_key_policy_is_rejected() {
        let result: Result<ScriptoriumConfig, _> =
            serde_yaml::from_str("settings:\n  key_policy: random");
        assert!(result.is_err());
    }
}
