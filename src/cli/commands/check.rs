//! Check command implementation.
//!
//! The `scriptorium check` command prints the packages a script needs that
//! are not installed, without installing or running anything.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::args::CheckArgs;
use crate::error::Result;
use crate::requirements::MissingPackageList;
use crate::runner::Orchestrator;
use crate::ui::UserInterface;

use super::context::ProjectContext;
use super::dispatcher::{Command, CommandResult};

/// The check command implementation.
pub struct CheckCommand {
    project_root: PathBuf,
    config_override: Option<PathBuf>,
    args: CheckArgs,
}

#[derive(Serialize)]
struct CheckReport<'a> {
    script: &'a str,
    category: &'a str,
    missing: &'a MissingPackageList,
}

impl CheckCommand {
    /// Create a new check command.
    pub fn new(project_root: &Path, config_override: Option<&Path>, args: CheckArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config_override: config_override.map(Path::to_path_buf),
            args,
        }
    }
}

impl Command for CheckCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(ctx) =
            ProjectContext::load(&self.project_root, self.config_override.as_deref(), ui)?
        else {
            return Ok(CommandResult::failure(2));
        };
        let Some(script) = ctx.resolve(&self.args.script, ui) else {
            return Ok(CommandResult::failure(2));
        };

        let orchestrator = Orchestrator::from_config(&ctx.config);
        let missing = match orchestrator.check(script) {
            Ok(missing) => missing,
            Err(e) => {
                ui.error(&e.to_string());
                return Ok(CommandResult::failure(1));
            }
        };

        if self.args.json {
            let report = CheckReport {
                script: &script.name,
                category: &script.category,
                missing: &missing,
            };
            let json = serde_json::to_string_pretty(&report).map_err(anyhow::Error::from)?;
            println!("{}", json);
        } else if missing.is_empty() {
            ui.success(&format!("'{}' has everything it needs", script.name));
        } else {
            ui.message(&format!("'{}' is missing: {}", script.name, missing));
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn unknown_script_fails() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".scriptorium");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.yml"), "categories: []\n").unwrap();

        let cmd = CheckCommand::new(
            temp.path(),
            None,
            CheckArgs {
                script: "nope".to_string(),
                json: false,
            },
        );
        let mut ui = MockUI::new();
        let result = cmd.execute(&mut ui).unwrap();

        assert_eq!(result.exit_code, 2);
        assert!(ui.has_error("Unknown script: nope"));
    }

    #[test]
    fn unreadable_script_fails() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".scriptorium");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("config.yml"),
            "categories:\n  - name: T\n    scripts:\n      - { name: gone, path: gone.py }\n",
        )
        .unwrap();

        let cmd = CheckCommand::new(
            temp.path(),
            None,
            CheckArgs {
                script: "gone".to_string(),
                json: false,
            },
        );
        let mut ui = MockUI::new();
        let result = cmd.execute(&mut ui).unwrap();

        assert_eq!(result.exit_code, 1);
        assert!(ui.has_error("gone.py"));
    }
}
