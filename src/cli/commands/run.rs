//! Run command implementation.
//!
//! The `scriptorium run` command starts one or more scripts side by side,
//! relays their output until every one of them has finished, and forwards
//! terminal input lines to them. A line of the form `name> text` goes to
//! the script keyed `name`; any other line goes to the first script that
//! is still running.

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread;

use crate::catalog::{ScriptDescriptor, ScriptKey};
use crate::cli::args::RunArgs;
use crate::error::Result;
use crate::runner::{Orchestrator, RunOutcome, DEFAULT_POLL};
use crate::supervisor::ScriptStatus;
use crate::ui::{
    OutputMode, Prompt, PromptOption, PromptResult, PromptType, UserInterface,
};

use super::context::ProjectContext;
use super::dispatcher::{Command, CommandResult};

/// The run command implementation.
pub struct RunCommand {
    project_root: PathBuf,
    config_override: Option<PathBuf>,
    args: RunArgs,
}

impl RunCommand {
    /// Create a new run command.
    pub fn new(project_root: &Path, config_override: Option<&Path>, args: RunArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config_override: config_override.map(Path::to_path_buf),
            args,
        }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &RunArgs {
        &self.args
    }

    /// Scripts named on the command line, or one picked interactively.
    ///
    /// `None` means an error was already reported.
    fn select_scripts(
        &self,
        ctx: &ProjectContext,
        ui: &mut dyn UserInterface,
    ) -> Result<Option<Vec<ScriptDescriptor>>> {
        if !self.args.scripts.is_empty() {
            let mut scripts = Vec::new();
            for name in &self.args.scripts {
                match ctx.resolve(name, ui) {
                    Some(script) => scripts.push(script.clone()),
                    None => return Ok(None),
                }
            }
            return Ok(Some(scripts));
        }

        if ctx.catalog.is_empty() {
            ui.error("No scripts configured");
            return Ok(None);
        }
        if !ui.is_interactive() {
            ui.error("No script given. Pass one or more script names to run.");
            return Ok(None);
        }

        let options = ctx
            .catalog
            .scripts()
            .map(|s| PromptOption {
                label: format!("{} / {}", s.category, s.name),
                value: format!("{}/{}", s.category, s.name),
            })
            .collect();
        let prompt = Prompt {
            key: "script".to_string(),
            question: "Run which script?".to_string(),
            prompt_type: PromptType::Select { options },
            default: None,
        };
        let choice = ui.prompt(&prompt)?.as_string();
        Ok(ctx.resolve(&choice, ui).map(|s| vec![s.clone()]))
    }
}

impl Command for RunCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(ctx) =
            ProjectContext::load(&self.project_root, self.config_override.as_deref(), ui)?
        else {
            return Ok(CommandResult::failure(2));
        };
        let Some(scripts) = self.select_scripts(&ctx, ui)? else {
            return Ok(CommandResult::failure(2));
        };

        let mut auto;
        let ui: &mut dyn UserInterface = if self.args.yes {
            auto = AutoConfirm::new(ui);
            &mut auto
        } else {
            ui
        };

        let mut orchestrator = Orchestrator::from_config(&ctx.config);
        let mut keys: Vec<ScriptKey> = Vec::new();

        for script in &scripts {
            let key = orchestrator.key_for(script);
            if !keys.contains(&key) {
                keys.push(key);
            }
            match orchestrator.run_script(script, ui) {
                Ok(RunOutcome::Launched) => tracing::debug!("Started '{}'", script.name),
                Ok(outcome) => tracing::debug!("Run of '{}': {:?}", script.name, outcome),
                Err(e) => ui.error(&e.to_string()),
            }
        }

        let input = spawn_stdin_reader();
        while orchestrator.has_work() {
            orchestrator.pump(DEFAULT_POLL, ui);
            if let Some(input) = &input {
                while let Ok(line) = input.try_recv() {
                    forward_line(&mut orchestrator, &keys, &line, ui);
                }
            }
        }

        let unfinished: Vec<&ScriptKey> = keys
            .iter()
            .filter(|k| orchestrator.status(k) != ScriptStatus::Finished)
            .collect();

        if unfinished.is_empty() {
            if keys.len() > 1 {
                ui.success(&format!("All {} scripts finished", keys.len()));
            }
            Ok(CommandResult::success())
        } else {
            let names: Vec<_> = unfinished.iter().map(|k| k.as_str()).collect();
            ui.error(&format!("Did not finish: {}", names.join(", ")));
            Ok(CommandResult::failure(1))
        }
    }
}

/// Route one input line to a running script.
fn forward_line<P: crate::requirements::probe::Probe>(
    orchestrator: &mut Orchestrator<P>,
    keys: &[ScriptKey],
    line: &str,
    ui: &mut dyn UserInterface,
) {
    let running: Vec<ScriptKey> = keys
        .iter()
        .filter(|k| orchestrator.status(k) == ScriptStatus::Running)
        .cloned()
        .collect();

    match route_input(line, &running) {
        Some((key, text)) => {
            if !orchestrator.send_input(&key, text) {
                tracing::debug!("Input for '{}' was not delivered", key);
            }
        }
        None => ui.warning("No running script to receive input"),
    }
}

/// Pick the target of an input line among `running` keys (launch order).
///
/// `name> text` addresses `name` when it is running; otherwise the whole
/// line goes to the first running key.
pub fn route_input<'a>(line: &'a str, running: &[ScriptKey]) -> Option<(ScriptKey, &'a str)> {
    if let Some((name, text)) = line.split_once('>') {
        if let Some(key) = running.iter().find(|k| k.as_str() == name.trim()) {
            return Some((key.clone(), text.strip_prefix(' ').unwrap_or(text)));
        }
    }
    running.first().map(|key| (key.clone(), line))
}

/// Read stdin lines on a background thread.
fn spawn_stdin_reader() -> Option<Receiver<String>> {
    let (tx, rx) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name("stdin".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });

    match spawned {
        Ok(_) => Some(rx),
        Err(e) => {
            tracing::warn!("Could not read terminal input: {}", e);
            None
        }
    }
}

/// Answers every confirmation with yes; everything else passes through.
struct AutoConfirm<'a> {
    inner: &'a mut dyn UserInterface,
}

impl<'a> AutoConfirm<'a> {
    fn new(inner: &'a mut dyn UserInterface) -> Self {
        Self { inner }
    }
}

impl UserInterface for AutoConfirm<'_> {
    fn output_mode(&self) -> OutputMode {
        self.inner.output_mode()
    }

    fn set_output_mode(&mut self, mode: OutputMode) {
        self.inner.set_output_mode(mode);
    }

    fn message(&mut self, msg: &str) {
        self.inner.message(msg);
    }

    fn success(&mut self, msg: &str) {
        self.inner.success(msg);
    }

    fn warning(&mut self, msg: &str) {
        self.inner.warning(msg);
    }

    fn error(&mut self, msg: &str) {
        self.inner.error(msg);
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        match prompt.prompt_type {
            PromptType::Confirm => {
                tracing::debug!("Auto-confirming '{}'", prompt.key);
                Ok(PromptResult::Bool(true))
            }
            _ => self.inner.prompt(prompt),
        }
    }

    fn show_header(&mut self, title: &str) {
        self.inner.show_header(title);
    }

    fn is_interactive(&self) -> bool {
        self.inner.is_interactive()
    }

    fn script_output(&mut self, key: &ScriptKey, text: &str) {
        self.inner.script_output(key, text);
    }

    fn status_changed(&mut self, key: &ScriptKey, status: ScriptStatus) {
        self.inner.status_changed(key, status);
    }

    fn install_log(&mut self, text: &str) {
        self.inner.install_log(text);
    }
}
