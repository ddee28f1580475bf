//! Non-interactive UI for CI/headless environments.

use std::collections::HashMap;

use crate::catalog::ScriptKey;
use crate::error::{Result, ScriptoriumError};
use crate::supervisor::ScriptStatus;

use super::theme::ScriptoriumTheme;
use super::{parse_confirm, OutputMode, Prompt, PromptResult, PromptType, UserInterface};

/// Prefix of environment variables that answer prompts.
pub const PROMPT_ENV_PREFIX: &str = "SCRIPTORIUM_PROMPT_";

/// UI implementation for non-interactive mode.
///
/// Prompts are answered from `SCRIPTORIUM_PROMPT_<KEY>` variables or the
/// prompt default. When running in CI (detected via `is_ci()`), installer
/// output is only shown in verbose mode since it floods log-based
/// environments.
pub struct NonInteractiveUI {
    mode: OutputMode,
    env_overrides: HashMap<String, String>,
    theme: ScriptoriumTheme,
    is_ci: bool,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI.
    pub fn new(mode: OutputMode) -> Self {
        Self::with_ci(mode, crate::shell::is_ci())
    }

    /// Create with explicit overrides (for testing).
    pub fn with_overrides(mode: OutputMode, overrides: HashMap<String, String>) -> Self {
        Self {
            mode,
            env_overrides: overrides,
            theme: ScriptoriumTheme::plain(),
            is_ci: false,
        }
    }

    /// Create with explicit CI flag (for testing).
    pub fn with_ci(mode: OutputMode, is_ci: bool) -> Self {
        let env_overrides: HashMap<String, String> = std::env::vars()
            .filter(|(k, _)| k.starts_with(PROMPT_ENV_PREFIX))
            .collect();

        Self {
            mode,
            env_overrides,
            theme: ScriptoriumTheme::plain(),
            is_ci,
        }
    }

    fn override_for(&self, key: &str) -> Option<&String> {
        self.env_overrides.get(&prompt_env_var(key))
    }

    fn shows_install_log(&self) -> bool {
        if self.is_ci {
            self.mode == OutputMode::Verbose
        } else {
            self.mode.shows_install_log()
        }
    }
}

/// Environment variable that answers the prompt `key`.
///
/// `install_My Script` becomes `SCRIPTORIUM_PROMPT_INSTALL_MY_SCRIPT`.
pub fn prompt_env_var(key: &str) -> String {
    let suffix: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{}{}", PROMPT_ENV_PREFIX, suffix)
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn set_output_mode(&mut self, mode: OutputMode) {
        self.mode = mode;
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", self.theme.format_success(msg));
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("{}", self.theme.format_warning(msg));
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("{}", self.theme.format_error(msg));
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        let answer = self
            .override_for(&prompt.key)
            .or(prompt.default.as_ref())
            .cloned()
            .ok_or_else(|| ScriptoriumError::ConfigValidationError {
                message: format!(
                    "Cannot prompt for '{}' in non-interactive mode (no default value)",
                    prompt.key
                ),
            })?;

        Ok(match prompt.prompt_type {
            PromptType::Confirm => PromptResult::Bool(parse_confirm(&answer)),
            PromptType::Select { .. } => PromptResult::String(answer),
        })
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("\n{}\n", title);
        }
    }

    fn is_interactive(&self) -> bool {
        false
    }

    fn script_output(&mut self, key: &ScriptKey, text: &str) {
        if self.mode.shows_script_output() {
            println!("{}", self.theme.format_output(key.as_str(), text));
        }
    }

    fn status_changed(&mut self, key: &ScriptKey, status: ScriptStatus) {
        let shown = self.mode.shows_transitions()
            || (status == ScriptStatus::Failed && self.mode.shows_status());
        if shown {
            println!("{}", self.theme.format_status(key.as_str(), status));
        }
    }

    fn install_log(&mut self, text: &str) {
        if self.shows_install_log() {
            println!("{}", self.theme.format_install(text));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::PromptOption;

    fn prompt(key: &str, prompt_type: PromptType, default: Option<&str>) -> Prompt {
        Prompt {
            key: key.to_string(),
            question: "Test?".to_string(),
            prompt_type,
            default: default.map(String::from),
        }
    }

    fn select() -> PromptType {
        PromptType::Select {
            options: vec![PromptOption {
                label: "Tools / hello".to_string(),
                value: "hello".to_string(),
            }],
        }
    }

    #[test]
    fn non_interactive_is_not_interactive() {
        let ui = NonInteractiveUI::new(OutputMode::Normal);
        assert!(!ui.is_interactive());
    }

    #[test]
    fn prompt_uses_default() {
        let mut ui = NonInteractiveUI::with_overrides(OutputMode::Normal, HashMap::new());
        let result = ui
            .prompt(&prompt("script", select(), Some("default_value")))
            .unwrap();
        assert_eq!(result.as_string(), "default_value");
    }

    #[test]
    fn prompt_fails_without_default() {
        let mut ui = NonInteractiveUI::with_overrides(OutputMode::Normal, HashMap::new());
        assert!(ui.prompt(&prompt("script", select(), None)).is_err());
    }

    #[test]
    fn confirm_default_is_a_bool() {
        let mut ui = NonInteractiveUI::with_overrides(OutputMode::Normal, HashMap::new());
        let result = ui
            .prompt(&prompt("install_x", PromptType::Confirm, Some("yes")))
            .unwrap();
        assert_eq!(result, PromptResult::Bool(true));
    }

    #[test]
    fn confirm_env_override_wins() {
        let mut overrides = HashMap::new();
        overrides.insert(
            "SCRIPTORIUM_PROMPT_INSTALL_REPORT".to_string(),
            "no".to_string(),
        );
        let mut ui = NonInteractiveUI::with_overrides(OutputMode::Normal, overrides);

        let result = ui
            .prompt(&prompt("install_report", PromptType::Confirm, Some("yes")))
            .unwrap();
        assert_eq!(result, PromptResult::Bool(false));
    }

    #[test]
    fn env_var_names_are_sanitized() {
        assert_eq!(prompt_env_var("test"), "SCRIPTORIUM_PROMPT_TEST");
        assert_eq!(
            prompt_env_var("install_My Script-2"),
            "SCRIPTORIUM_PROMPT_INSTALL_MY_SCRIPT_2"
        );
    }

    #[test]
    fn output_mode_preserved() {
        let ui = NonInteractiveUI::new(OutputMode::Quiet);
        assert_eq!(ui.output_mode(), OutputMode::Quiet);
    }

    #[test]
    fn ci_hides_install_log_unless_verbose() {
        assert!(!NonInteractiveUI::with_ci(OutputMode::Normal, true).shows_install_log());
        assert!(NonInteractiveUI::with_ci(OutputMode::Verbose, true).shows_install_log());
        assert!(NonInteractiveUI::with_ci(OutputMode::Normal, false).shows_install_log());
    }
}
