//! List command implementation.
//!
//! The `scriptorium list` command shows the catalog as a category tree.

use std::path::{Path, PathBuf};

use crate::cli::args::ListArgs;
use crate::error::Result;
use crate::ui::theme::ScriptoriumTheme;
use crate::ui::{should_use_colors, UserInterface};

use super::context::ProjectContext;
use super::dispatcher::{Command, CommandResult};

/// The list command implementation.
pub struct ListCommand {
    project_root: PathBuf,
    config_override: Option<PathBuf>,
    args: ListArgs,
}

impl ListCommand {
    /// Create a new list command.
    pub fn new(project_root: &Path, config_override: Option<&Path>, args: ListArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config_override: config_override.map(Path::to_path_buf),
            args,
        }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ListArgs {
        &self.args
    }
}

impl Command for ListCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(ctx) =
            ProjectContext::load(&self.project_root, self.config_override.as_deref(), ui)?
        else {
            return Ok(CommandResult::failure(2));
        };

        let catalog = match &self.args.filter {
            Some(query) => ctx.catalog.filter(query),
            None => ctx.catalog,
        };

        if self.args.json {
            let json = serde_json::to_string_pretty(catalog.categories())
                .map_err(anyhow::Error::from)?;
            println!("{}", json);
            return Ok(CommandResult::success());
        }

        if catalog.is_empty() {
            match &self.args.filter {
                Some(query) => ui.message(&format!("No scripts match '{}'", query)),
                None => ui.message("No scripts configured"),
            }
            return Ok(CommandResult::success());
        }

        let theme = if should_use_colors() {
            ScriptoriumTheme::new()
        } else {
            ScriptoriumTheme::plain()
        };

        for category in catalog.categories() {
            ui.message(&format!("  {}", theme.key.apply_to(&category.name)));
            let last = category.scripts.len().saturating_sub(1);
            for (i, script) in category.scripts.iter().enumerate() {
                let branch = if i == last { "└──" } else { "├──" };
                let path = script
                    .path
                    .strip_prefix(&ctx.root)
                    .unwrap_or(&script.path);
                ui.message(&format!(
                    "  {} {} {}",
                    theme.dim.apply_to(branch),
                    theme.highlight.apply_to(&script.name),
                    theme.dim.apply_to(path.display())
                ));
            }
        }

        Ok(CommandResult::success())
    }
}
