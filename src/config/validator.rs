//! Configuration validation rules.
//!
//! - The interpreter, when set, must not be blank
//! - `declaration_scan_lines` must be at least 1
//! - `install_command`, when set, must name a program
//! - Every script needs a name and a path
//! - Script names are unique within a category
//! - With `key_policy: name`, a name used in several categories is a warning

use crate::config::schema::{KeyPolicy, ScriptoriumConfig};
use crate::error::{Result, ScriptoriumError};
use std::collections::{HashMap, HashSet};

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The config cannot be used.
    Error,
    /// The config works but probably not as intended.
    Warning,
}

/// Validation finding with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable message
    pub message: String,
    /// Severity
    pub severity: Severity,
    /// Category name if the finding is category-specific
    pub category: Option<String>,
}

impl ValidationError {
    fn error(rule: &str, message: String, category: Option<&str>) -> Self {
        Self {
            rule: rule.to_string(),
            message,
            severity: Severity::Error,
            category: category.map(String::from),
        }
    }

    fn warning(rule: &str, message: String) -> Self {
        Self {
            rule: rule.to_string(),
            message,
            severity: Severity::Warning,
            category: None,
        }
    }
}

/// Validate a configuration and return every finding.
pub fn validate_config(config: &ScriptoriumConfig) -> Vec<ValidationError> {
    let mut errors = validate_settings(config);
    errors.extend(validate_categories(config));
    errors
}

fn validate_settings(config: &ScriptoriumConfig) -> Vec<ValidationError> {
    let settings = &config.settings;
    let mut errors = Vec::new();

    if settings
        .interpreter
        .as_deref()
        .is_some_and(|i| i.trim().is_empty())
    {
        errors.push(ValidationError::error(
            "empty-interpreter",
            "settings.interpreter must not be empty".to_string(),
            None,
        ));
    }

    if settings.declaration_scan_lines == 0 {
        errors.push(ValidationError::error(
            "scan-lines",
            "settings.declaration_scan_lines must be at least 1".to_string(),
            None,
        ));
    }

    if settings.declaration_marker.trim().is_empty() {
        errors.push(ValidationError::error(
            "empty-marker",
            "settings.declaration_marker must not be empty".to_string(),
            None,
        ));
    }

    if let Some(command) = &settings.install_command {
        if command.first().map_or(true, |p| p.trim().is_empty()) {
            errors.push(ValidationError::error(
                "empty-install-command",
                "settings.install_command must start with a program".to_string(),
                None,
            ));
        }
    }

    errors
}

fn validate_categories(config: &ScriptoriumConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut homes: HashMap<&str, Vec<&str>> = HashMap::new();

    for category in &config.categories {
        let mut seen = HashSet::new();

        for script in &category.scripts {
            if script.name.trim().is_empty() {
                errors.push(ValidationError::error(
                    "missing-name",
                    format!("A script in category '{}' has no name", category.name),
                    Some(&category.name),
                ));
                continue;
            }

            if script.path.as_os_str().is_empty() {
                errors.push(ValidationError::error(
                    "missing-path",
                    format!("Script '{}' has no path", script.name),
                    Some(&category.name),
                ));
            }

            if !seen.insert(script.name.as_str()) {
                errors.push(ValidationError::error(
                    "duplicate-script",
                    format!(
                        "Category '{}' lists script '{}' more than once",
                        category.name, script.name
                    ),
                    Some(&category.name),
                ));
            }

            let entry = homes.entry(script.name.as_str()).or_default();
            if !entry.contains(&category.name.as_str()) {
                entry.push(&category.name);
            }
        }
    }

    if config.settings.key_policy == KeyPolicy::Name {
        let mut shared: Vec<_> = homes.into_iter().filter(|(_, c)| c.len() > 1).collect();
        shared.sort();
        for (name, categories) in shared {
            errors.push(ValidationError::warning(
                "shared-key",
                format!(
                    "Script '{}' appears in {}; they share one process slot (set key_policy: qualified to separate them)",
                    name,
                    categories.join(", ")
                ),
            ));
        }
    }

    errors
}

/// Validate and fail on the first error-severity findings.
///
/// Warnings are returned so the caller can surface them.
///
/// # Errors
///
/// Returns `ConfigValidationError` if any error-severity rule fails.
pub fn validate(config: &ScriptoriumConfig) -> Result<Vec<ValidationError>> {
    let (errors, warnings): (Vec<_>, Vec<_>) = validate_config(config)
        .into_iter()
        .partition(|e| e.severity == Severity::Error);

    if errors.is_empty() {
        Ok(warnings)
    } else {
        let messages: Vec<_> = errors.iter().map(|e| e.message.clone()).collect();
        Err(ScriptoriumError::ConfigValidationError {
            message: messages.join("; "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{CategoryConfig, ScriptConfig};
    use std::path::PathBuf;

    fn script(name: &str) -> ScriptConfig {
        ScriptConfig {
            name: name.to_string(),
            path: PathBuf::from(format!("{}.py", name)),
        }
    }

    fn category(name: &str, scripts: &[&str]) -> CategoryConfig {
        CategoryConfig {
            name: name.to_string(),
            scripts: scripts.iter().map(|s| script(s)).collect(),
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&ScriptoriumConfig::default()).is_empty());
    }

    #[test]
    fn zero_scan_lines_is_error() {
        let mut config = ScriptoriumConfig::default();
        config.settings.declaration_scan_lines = 0;

        let errors = validate_config(&config);
        assert!(errors.iter().any(|e| e.rule == "scan-lines"));
        assert!(validate(&config).is_err());
    }

    #[test]
    fn blank_interpreter_is_error() {
        let mut config = ScriptoriumConfig::default();
        config.settings.interpreter = Some("  ".to_string());

        assert!(validate_config(&config)
            .iter()
            .any(|e| e.rule == "empty-interpreter"));
    }

    #[test]
    fn empty_install_command_is_error() {
        let mut config = ScriptoriumConfig::default();
        config.settings.install_command = Some(Vec::new());

        assert!(validate_config(&config)
            .iter()
            .any(|e| e.rule == "empty-install-command"));
    }

    #[test]
    fn duplicate_within_category_is_error() {
        let mut config = ScriptoriumConfig::default();
        config.categories.push(category("Tools", &["a", "a"]));

        let errors = validate_config(&config);
        let dup = errors.iter().find(|e| e.rule == "duplicate-script").unwrap();
        assert_eq!(dup.category.as_deref(), Some("Tools"));
    }

    #[test]
    fn missing_path_is_error() {
        let mut config = ScriptoriumConfig::default();
        config.categories.push(CategoryConfig {
            name: "Tools".to_string(),
            scripts: vec![ScriptConfig {
                name: "x".to_string(),
                path: PathBuf::new(),
            }],
        });

        assert!(validate_config(&config)
            .iter()
            .any(|e| e.rule == "missing-path"));
    }

    #[test]
    fn shared_name_across_categories_warns_under_name_policy() {
        let mut config = ScriptoriumConfig::default();
        config.categories.push(category("One", &["report"]));
        config.categories.push(category("Two", &["report"]));

        let warnings = validate(&config).unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].rule, "shared-key");
        assert!(warnings[0].message.contains("One, Two"));
    }

    #[test]
    fn qualified_policy_silences_shared_name_warning() {
        let mut config = ScriptoriumConfig::default();
        config.settings.key_policy = KeyPolicy::Qualified;
        config.categories.push(category("One", &["report"]));
        config.categories.push(category("Two", &["report"]));

        assert!(validate(&config).unwrap().is_empty());
    }
}
