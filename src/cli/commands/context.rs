//! Configuration and catalog shared by every command.

use std::path::{Path, PathBuf};

use crate::catalog::{Catalog, ScriptDescriptor};
use crate::config::{load_config, validate, ScriptoriumConfig};
use crate::error::{Result, ScriptoriumError};
use crate::ui::{OutputMode, UserInterface};

/// A loaded, validated project.
#[derive(Debug)]
pub struct ProjectContext {
    /// Project root; relative script paths resolve against it.
    pub root: PathBuf,
    /// Merged configuration.
    pub config: ScriptoriumConfig,
    /// Catalog built from `config`.
    pub catalog: Catalog,
}

impl ProjectContext {
    /// Load, validate and catalog the project at `root`.
    ///
    /// Problems a user can fix (missing, unparsable or invalid config) are
    /// reported through `ui` and yield `Ok(None)`. Validation warnings are
    /// shown and otherwise ignored.
    pub fn load(
        root: &Path,
        config_override: Option<&Path>,
        ui: &mut dyn UserInterface,
    ) -> Result<Option<Self>> {
        let config = match load_config(root, config_override) {
            Ok(config) => config,
            Err(ScriptoriumError::ConfigNotFound { path }) => {
                ui.error(&format!(
                    "No configuration found at {}. Create it with a 'categories:' list.",
                    path.display()
                ));
                return Ok(None);
            }
            Err(ScriptoriumError::ConfigParseError { path, message }) => {
                ui.error(&format!("Parse error in {}: {}", path.display(), message));
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        // Apply config default_output when no CLI flag was explicitly set
        if ui.output_mode() == OutputMode::Normal {
            ui.set_output_mode(config.settings.default_output.into());
        }

        match validate(&config) {
            Ok(warnings) => {
                for warning in warnings {
                    tracing::debug!("Config warning [{}]: {}", warning.rule, warning.message);
                    ui.warning(&warning.message);
                }
            }
            Err(ScriptoriumError::ConfigValidationError { message }) => {
                ui.error(&format!("Invalid configuration: {}", message));
                return Ok(None);
            }
            Err(e) => return Err(e),
        }

        let catalog = Catalog::from_config(&config.categories, root);
        tracing::debug!("Loaded catalog with {} scripts", catalog.len());

        Ok(Some(Self {
            root: root.to_path_buf(),
            config,
            catalog,
        }))
    }

    /// Look up `name` in the catalog, reporting unknown names through `ui`.
    pub fn resolve(&self, name: &str, ui: &mut dyn UserInterface) -> Option<&ScriptDescriptor> {
        let found = self.catalog.find(name);
        if found.is_none() {
            let error = ScriptoriumError::UnknownScript {
                name: name.to_string(),
            };
            ui.error(&format!("{}. Run 'scriptorium list' to see what is available.", error));
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    fn project(config: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".scriptorium");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.yml"), config).unwrap();
        temp
    }

    #[test]
    fn missing_config_is_reported() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();

        let ctx = ProjectContext::load(temp.path(), None, &mut ui).unwrap();
        assert!(ctx.is_none());
        assert!(ui.has_error("No configuration found"));
    }

    #[test]
    fn parse_error_is_reported() {
        let temp = project("categories: [unclosed");
        let mut ui = MockUI::new();

        assert!(ProjectContext::load(temp.path(), None, &mut ui).unwrap().is_none());
        assert!(ui.has_error("Parse error"));
    }

    #[test]
    fn invalid_config_is_reported() {
        let temp = project("settings:\n  declaration_scan_lines: 0\n");
        let mut ui = MockUI::new();

        assert!(ProjectContext::load(temp.path(), None, &mut ui).unwrap().is_none());
        assert!(ui.has_error("Invalid configuration"));
    }

    #[test]
    fn shared_names_warn_but_load() {
        let temp = project(
            r#"
categories:
  - name: A
    scripts:
      - { name: hello, path: a/hello.py }
  - name: B
    scripts:
      - { name: hello, path: b/hello.py }
"#,
        );
        let mut ui = MockUI::new();

        let ctx = ProjectContext::load(temp.path(), None, &mut ui)
            .unwrap()
            .unwrap();
        assert_eq!(ctx.catalog.len(), 2);
        assert!(ui.has_warning("hello"));
    }

    #[test]
    fn default_output_applies_without_flags() {
        let temp = project("settings:\n  default_output: quiet\n");
        let mut ui = MockUI::new();

        ProjectContext::load(temp.path(), None, &mut ui).unwrap();
        assert_eq!(ui.output_mode(), OutputMode::Quiet);
    }

    #[test]
    fn explicit_mode_is_kept() {
        let temp = project("settings:\n  default_output: quiet\n");
        let mut ui = MockUI::with_mode(OutputMode::Verbose);

        ProjectContext::load(temp.path(), None, &mut ui).unwrap();
        assert_eq!(ui.output_mode(), OutputMode::Verbose);
    }

    #[test]
    fn unknown_script_is_reported() {
        let temp = project("categories:\n  - name: T\n    scripts:\n      - { name: a, path: a.py }\n");
        let mut ui = MockUI::new();
        let ctx = ProjectContext::load(temp.path(), None, &mut ui)
            .unwrap()
            .unwrap();

        assert!(ctx.resolve("a", &mut ui).is_some());
        assert!(ctx.resolve("zzz", &mut ui).is_none());
        assert!(ui.has_error("Unknown script: zzz"));
    }
}
