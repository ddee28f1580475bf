//! Install command implementation.
//!
//! The `scriptorium install` command installs whatever a script is missing
//! and waits for the package manager, without running the script.

use std::path::{Path, PathBuf};

use crate::cli::args::InstallArgs;
use crate::error::Result;
use crate::runner::Orchestrator;
use crate::ui::UserInterface;

use super::context::ProjectContext;
use super::dispatcher::{Command, CommandResult};

/// The install command implementation.
pub struct InstallCommand {
    project_root: PathBuf,
    config_override: Option<PathBuf>,
    args: InstallArgs,
}

impl InstallCommand {
    /// Create a new install command.
    pub fn new(project_root: &Path, config_override: Option<&Path>, args: InstallArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config_override: config_override.map(Path::to_path_buf),
            args,
        }
    }
}

impl Command for InstallCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(ctx) =
            ProjectContext::load(&self.project_root, self.config_override.as_deref(), ui)?
        else {
            return Ok(CommandResult::failure(2));
        };
        let Some(script) = ctx.resolve(&self.args.script, ui) else {
            return Ok(CommandResult::failure(2));
        };

        let mut orchestrator = Orchestrator::from_config(&ctx.config);
        let job = match orchestrator.install_missing(script, ui) {
            Ok(Some(job)) => job,
            Ok(None) => return Ok(CommandResult::success()),
            Err(e) => {
                ui.error(&e.to_string());
                return Ok(CommandResult::failure(1));
            }
        };

        orchestrator.run_until_idle(ui);

        match orchestrator.install_result(job) {
            Some(result) if result.success => Ok(CommandResult::success()),
            Some(result) => Ok(CommandResult::failure(result.exit_code.unwrap_or(1))),
            None => Ok(CommandResult::failure(1)),
        }
    }
}
