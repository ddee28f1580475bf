//! Interactive terminal UI.

use console::Term;
use std::io::Write;

use crate::catalog::ScriptKey;
use crate::error::Result;
use crate::supervisor::ScriptStatus;

use super::{
    prompt_user, should_use_colors, NonInteractiveUI, OutputMode, Prompt, PromptResult,
    ScriptoriumTheme, UserInterface,
};

/// Interactive terminal UI implementation.
pub struct TerminalUI {
    term: Term,
    theme: ScriptoriumTheme,
    mode: OutputMode,
}

impl TerminalUI {
    /// Create a new terminal UI.
    pub fn new(mode: OutputMode) -> Self {
        let theme = if should_use_colors() {
            ScriptoriumTheme::new()
        } else {
            ScriptoriumTheme::plain()
        };

        Self {
            term: Term::stdout(),
            theme,
            mode,
        }
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn set_output_mode(&mut self, mode: OutputMode) {
        self.mode = mode;
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", msg).ok();
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_success(msg)).ok();
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_warning(msg)).ok();
        }
    }

    fn error(&mut self, msg: &str) {
        writeln!(self.term, "{}", self.theme.format_error(msg)).ok();
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        prompt_user(prompt, &self.term)
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "\n{}\n", self.theme.format_header(title)).ok();
        }
    }

    fn is_interactive(&self) -> bool {
        self.term.is_term()
    }

    fn script_output(&mut self, key: &ScriptKey, text: &str) {
        if self.mode.shows_script_output() {
            writeln!(self.term, "{}", self.theme.format_output(key.as_str(), text)).ok();
        }
    }

    fn status_changed(&mut self, key: &ScriptKey, status: ScriptStatus) {
        let shown = self.mode.shows_transitions()
            || (status == ScriptStatus::Failed && self.mode.shows_status());
        if shown {
            writeln!(self.term, "{}", self.theme.format_status(key.as_str(), status)).ok();
        }
    }

    fn install_log(&mut self, text: &str) {
        if self.mode.shows_install_log() {
            writeln!(self.term, "{}", self.theme.format_install(text)).ok();
        }
    }
}

/// Create the appropriate UI based on context.
pub fn create_ui(interactive: bool, mode: OutputMode) -> Box<dyn UserInterface> {
    if interactive && Term::stdout().is_term() {
        Box::new(TerminalUI::new(mode))
    } else {
        Box::new(NonInteractiveUI::new(mode))
    }
}
