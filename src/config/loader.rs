//! Configuration file discovery and loading.

use crate::config::merger::merge_configs;
use crate::config::schema::ScriptoriumConfig;
use crate::error::{Result, ScriptoriumError};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the per-project configuration directory.
pub const CONFIG_DIR: &str = ".scriptorium";

/// Paths to configuration files in priority order (later overrides earlier).
///
/// Merge order:
/// 1. User global config (`~/.scriptorium/config.yml`)
/// 2. Project config (`.scriptorium/config.yml`)
/// 3. Local overrides (`.scriptorium/config.local.yml`)
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// User's global config
    pub user_global: Option<PathBuf>,

    /// Project config
    pub project: Option<PathBuf>,

    /// Local overrides
    pub project_local: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover config files for the given project root.
    pub fn discover(project_root: &Path) -> Self {
        Self {
            user_global: dirs::home_dir()
                .map(|home| home.join(CONFIG_DIR).join("config.yml"))
                .filter(|p| p.exists()),
            project: existing(project_root.join(CONFIG_DIR).join("config.yml")),
            project_local: existing(project_root.join(CONFIG_DIR).join("config.local.yml")),
        }
    }

    /// All existing config paths in merge order.
    pub fn all_existing(&self) -> Vec<&PathBuf> {
        [&self.user_global, &self.project, &self.project_local]
            .into_iter()
            .flatten()
            .collect()
    }

    /// Check if a project config exists.
    pub fn has_project_config(&self) -> bool {
        self.project.is_some()
    }
}

fn existing(path: PathBuf) -> Option<PathBuf> {
    path.exists().then_some(path)
}

/// Find the project root by walking up from `start`.
///
/// A directory containing `.scriptorium/` wins; `.git` is the fallback.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        if current.join(CONFIG_DIR).is_dir() {
            return Some(current);
        }

        if current.join(".git").exists() {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load a single config file.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<ScriptoriumConfig> {
    let value = load_config_value(path)?;
    from_value(value, path)
}

/// Parse YAML content into a config.
pub fn parse_config(content: &str, source_path: &Path) -> Result<ScriptoriumConfig> {
    let value: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| ScriptoriumError::ConfigParseError {
            path: source_path.to_path_buf(),
            message: e.to_string(),
        })?;
    from_value(value, source_path)
}

fn from_value(value: serde_yaml::Value, source_path: &Path) -> Result<ScriptoriumConfig> {
    if value.is_null() {
        return Ok(ScriptoriumConfig::default());
    }
    serde_yaml::from_value(value).map_err(|e| ScriptoriumError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load a config file as a raw YAML value (for merging).
pub fn load_config_value(path: &Path) -> Result<serde_yaml::Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ScriptoriumError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ScriptoriumError::Io(e)
        }
    })?;

    serde_yaml::from_str(&content).map_err(|e| ScriptoriumError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load and merge all config files for a project.
///
/// # Errors
///
/// Returns `ConfigNotFound` if no project config exists.
/// Returns `ConfigParseError` if any config file is invalid.
pub fn load_merged_config(project_root: &Path) -> Result<ScriptoriumConfig> {
    let paths = ConfigPaths::discover(project_root);
    let project_path = project_root.join(CONFIG_DIR).join("config.yml");

    if !paths.has_project_config() {
        return Err(ScriptoriumError::ConfigNotFound { path: project_path });
    }

    let configs = paths
        .all_existing()
        .into_iter()
        .map(|path| load_config_value(path))
        .collect::<Result<Vec<_>>>()?;

    from_value(merge_configs(&configs), &project_path)
}

/// Load config with optional path override.
///
/// An override replaces the project file only; user-global and local
/// layers still apply around it.
pub fn load_config(project_root: &Path, config_override: Option<&Path>) -> Result<ScriptoriumConfig> {
    let Some(override_path) = config_override else {
        return load_merged_config(project_root);
    };

    let paths = ConfigPaths::discover(project_root);
    let mut configs = Vec::new();
    if let Some(global) = &paths.user_global {
        configs.push(load_config_value(global)?);
    }
    configs.push(load_config_value(override_path)?);
    if let Some(local) = &paths.project_local {
        configs.push(load_config_value(local)?);
    }

    from_value(merge_configs(&configs), override_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{KeyPolicy, OutputMode};
    use tempfile::TempDir;

    fn write_project(root: &Path, name: &str, content: &str) {
        let dir = root.join(CONFIG_DIR);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn discover_finds_project_and_local() {
        let temp = TempDir::new().unwrap();
        write_project(temp.path(), "config.yml", "");
        write_project(temp.path(), "config.local.yml", "");

        let paths = ConfigPaths::discover(temp.path());
        assert!(paths.has_project_config());
        assert!(paths.project_local.is_some());

        let all = paths.all_existing();
        let project_pos = all.iter().position(|p| p.ends_with("config.yml")).unwrap();
        let local_pos = all
            .iter()
            .position(|p| p.ends_with("config.local.yml"))
            .unwrap();
        assert!(project_pos < local_pos);
    }

    #[test]
    fn discover_returns_none_for_missing_configs() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::discover(temp.path());
        assert!(paths.project.is_none());
        assert!(paths.project_local.is_none());
    }

    #[test]
    fn find_project_root_prefers_config_dir_over_git() {
        let temp = TempDir::new().unwrap();
        let subdir = temp.path().join("nested").join("project");
        fs::create_dir_all(subdir.join("deep")).unwrap();
        fs::create_dir_all(temp.path().join(".git")).unwrap();
        fs::create_dir_all(subdir.join(CONFIG_DIR)).unwrap();

        assert_eq!(find_project_root(&subdir.join("deep")), Some(subdir));
    }

    #[test]
    fn find_project_root_falls_back_to_git() {
        let temp = TempDir::new().unwrap();
        let subdir = temp.path().join("src");
        fs::create_dir_all(&subdir).unwrap();
        fs::create_dir_all(temp.path().join(".git")).unwrap();

        assert_eq!(find_project_root(&subdir), Some(temp.path().to_path_buf()));
    }

    #[test]
    fn load_config_file_returns_not_found_error() {
        let result = load_config_file(Path::new("/nonexistent/config.yml"));
        assert!(matches!(result, Err(ScriptoriumError::ConfigNotFound { .. })));
    }

    #[test]
    fn parse_config_reports_invalid_yaml() {
        let result = parse_config("categories: [", Path::new("test.yml"));
        assert!(matches!(result, Err(ScriptoriumError::ConfigParseError { .. })));
    }

    #[test]
    fn empty_file_is_default_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        fs::write(&path, "").unwrap();

        let config = load_config_file(&path).unwrap();
        assert!(config.categories.is_empty());
        assert_eq!(config.settings.declaration_scan_lines, 15);
    }

    #[test]
    fn local_overrides_settings_but_keeps_catalog() {
        let temp = TempDir::new().unwrap();
        write_project(
            temp.path(),
            "config.yml",
            r#"
settings:
  key_policy: qualified
categories:
  - name: Tools
    scripts:
      - { name: hello, path: hello.py }
"#,
        );
        write_project(
            temp.path(),
            "config.local.yml",
            "settings:\n  default_output: silent\n",
        );

        let config = load_merged_config(temp.path()).unwrap();
        assert_eq!(config.settings.key_policy, KeyPolicy::Qualified);
        assert_eq!(config.settings.default_output, OutputMode::Silent);
        assert_eq!(config.categories.len(), 1);
    }

    #[test]
    fn load_merged_config_fails_without_project_config() {
        let temp = TempDir::new().unwrap();
        let result = load_merged_config(temp.path());
        assert!(matches!(result, Err(ScriptoriumError::ConfigNotFound { .. })));
    }

    #[test]
    fn override_replaces_project_file() {
        let temp = TempDir::new().unwrap();
        write_project(temp.path(), "config.yml", "aliases: { a: from-project }");
        let custom = temp.path().join("custom.yml");
        fs::write(&custom, "aliases: { a: from-override }").unwrap();

        let config = load_config(temp.path(), Some(&custom)).unwrap();
        assert_eq!(config.aliases["a"], "from-override");
    }
}
