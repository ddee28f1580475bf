//! Mock UI implementation for testing.
//!
//! `MockUI` implements the `UserInterface` trait and captures all
//! interactions for later assertion. It can be configured with
//! pre-determined prompt responses.
//!
//! # Example
//!
//! ```
//! use scriptorium::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.set_prompt_response("install_report", "yes");
//!
//! ui.message("Installing requests...");
//! ui.success("Installed requests");
//!
//! assert!(ui.has_message("Installing"));
//! assert!(ui.successes().contains(&"Installed requests".to_string()));
//! ```

use std::collections::{HashMap, VecDeque};

use crate::catalog::ScriptKey;
use crate::error::Result;
use crate::supervisor::ScriptStatus;

use super::{parse_confirm, OutputMode, Prompt, PromptResult, PromptType, UserInterface};

/// Mock UI implementation for testing.
///
/// Supports both single responses (via `set_prompt_response`) and queued
/// responses (via `queue_prompt_responses`) for keys asked more than once.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    interactive: bool,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    headers: Vec<String>,
    outputs: Vec<(String, String)>,
    statuses: Vec<(String, ScriptStatus)>,
    install_logs: Vec<String>,
    prompt_responses: HashMap<String, String>,
    prompt_queues: HashMap<String, VecDeque<String>>,
    prompts_shown: Vec<String>,
    /// Fallback response for any prompt key not configured otherwise.
    default_prompt_response: Option<String>,
}

impl MockUI {
    /// Create a new MockUI with Normal output mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new MockUI with a specific output mode.
    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Set a response for a prompt key.
    pub fn set_prompt_response(&mut self, key: &str, response: &str) {
        self.prompt_responses
            .insert(key.to_string(), response.to_string());
    }

    /// Queue multiple responses for the same prompt key.
    ///
    /// After the queue is exhausted, falls back to `set_prompt_response`
    /// or defaults.
    pub fn queue_prompt_responses(&mut self, key: &str, responses: Vec<&str>) {
        let queue = responses.into_iter().map(|s| s.to_string()).collect();
        self.prompt_queues.insert(key.to_string(), queue);
    }

    /// Set a default response for any prompt key not explicitly configured.
    pub fn set_default_prompt_response(&mut self, response: &str) {
        self.default_prompt_response = Some(response.to_string());
    }

    /// Set whether this mock behaves as interactive.
    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Every installer chunk, in arrival order.
    pub fn install_logs(&self) -> &[String] {
        &self.install_logs
    }

    /// Get all prompts that were shown (by key).
    pub fn prompts_shown(&self) -> &[String] {
        &self.prompts_shown
    }

    /// Output chunks relayed for `key`, in order.
    pub fn outputs_for(&self, key: &str) -> Vec<String> {
        self.outputs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, text)| text.clone())
            .collect()
    }

    /// Status transitions reported for `key`, in order.
    pub fn statuses_for(&self, key: &str) -> Vec<ScriptStatus> {
        self.statuses
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, status)| *status)
            .collect()
    }

    /// The last status reported for `key`, if any.
    pub fn last_status(&self, key: &str) -> Option<ScriptStatus> {
        self.statuses_for(key).last().copied()
    }

    pub fn has_message(&self, msg: &str) -> bool {
        self.messages.iter().any(|m| m.contains(msg))
    }

    pub fn has_success(&self, msg: &str) -> bool {
        self.successes.iter().any(|m| m.contains(msg))
    }

    pub fn has_error(&self, msg: &str) -> bool {
        self.errors.iter().any(|m| m.contains(msg))
    }

    pub fn has_warning(&self, msg: &str) -> bool {
        self.warnings.iter().any(|m| m.contains(msg))
    }

    /// Clear all captured interactions.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.successes.clear();
        self.warnings.clear();
        self.errors.clear();
        self.headers.clear();
        self.outputs.clear();
        self.statuses.clear();
        self.install_logs.clear();
        self.prompts_shown.clear();
    }

    fn configured_response(&mut self, key: &str) -> Option<String> {
        if let Some(response) = self.prompt_queues.get_mut(key).and_then(|q| q.pop_front()) {
            return Some(response);
        }
        self.prompt_responses
            .get(key)
            .or(self.default_prompt_response.as_ref())
            .cloned()
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn set_output_mode(&mut self, mode: OutputMode) {
        self.mode = mode;
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        self.prompts_shown.push(prompt.key.clone());

        let response = self
            .configured_response(&prompt.key)
            .or_else(|| prompt.default.clone());

        Ok(match (&prompt.prompt_type, response) {
            (PromptType::Confirm, Some(answer)) => PromptResult::Bool(parse_confirm(&answer)),
            (PromptType::Confirm, None) => PromptResult::Bool(false),
            (_, answer) => PromptResult::String(answer.unwrap_or_default()),
        })
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn script_output(&mut self, key: &ScriptKey, text: &str) {
        self.outputs.push((key.to_string(), text.to_string()));
    }

    fn status_changed(&mut self, key: &ScriptKey, status: ScriptStatus) {
        self.statuses.push((key.to_string(), status));
    }

    fn install_log(&mut self, text: &str) {
        self.install_logs.push(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn confirm(key: &str, default: Option<&str>) -> Prompt {
        Prompt {
            key: key.to_string(),
            question: "Continue?".to_string(),
            prompt_type: PromptType::Confirm,
            default: default.map(String::from),
        }
    }

    #[test]
    fn captures_notices() {
        let mut ui = MockUI::new();
        ui.message("Hello");
        ui.success("Done");
        ui.warning("Careful");
        ui.error("Failed");
        ui.show_header("Scripts");

        assert!(ui.has_message("Hello"));
        assert!(ui.has_success("Done"));
        assert!(ui.has_warning("Careful"));
        assert!(ui.has_error("Failed"));
        assert_eq!(ui.headers(), ["Scripts".to_string()]);
    }

    #[test]
    fn script_events_are_grouped_by_key() {
        let mut ui = MockUI::new();
        let a = ScriptKey::new("a");
        let b = ScriptKey::new("b");
        ui.status_changed(&a, ScriptStatus::Running);
        ui.script_output(&a, "one");
        ui.script_output(&b, "other");
        ui.script_output(&a, "two");
        ui.status_changed(&a, ScriptStatus::Finished);

        assert_eq!(ui.outputs_for("a"), vec!["one", "two"]);
        assert_eq!(ui.outputs_for("b"), vec!["other"]);
        assert_eq!(
            ui.statuses_for("a"),
            vec![ScriptStatus::Running, ScriptStatus::Finished]
        );
        assert_eq!(ui.last_status("a"), Some(ScriptStatus::Finished));
        assert_eq!(ui.last_status("b"), None);
    }

    #[test]
    fn confirm_uses_configured_response() {
        let mut ui = MockUI::new();
        ui.set_prompt_response("install_x", "no");

        let result = ui.prompt(&confirm("install_x", Some("yes"))).unwrap();
        assert_eq!(result, PromptResult::Bool(false));
        assert_eq!(ui.prompts_shown(), ["install_x".to_string()]);
    }

    #[test]
    fn confirm_falls_back_to_prompt_default() {
        let mut ui = MockUI::new();
        let result = ui.prompt(&confirm("install_x", Some("yes"))).unwrap();
        assert_eq!(result, PromptResult::Bool(true));

        let result = ui.prompt(&confirm("install_y", None)).unwrap();
        assert_eq!(result, PromptResult::Bool(false));
    }

    #[test]
    fn queued_responses_come_first() {
        let mut ui = MockUI::new();
        ui.queue_prompt_responses("k", vec!["yes", "no"]);
        ui.set_prompt_response("k", "yes");

        assert_eq!(ui.prompt(&confirm("k", None)).unwrap(), PromptResult::Bool(true));
        assert_eq!(ui.prompt(&confirm("k", None)).unwrap(), PromptResult::Bool(false));
        assert_eq!(ui.prompt(&confirm("k", None)).unwrap(), PromptResult::Bool(true));
    }

    #[test]
    fn default_response_applies_to_unknown_keys() {
        let mut ui = MockUI::new();
        ui.set_default_prompt_response("n");
        assert_eq!(
            ui.prompt(&confirm("anything", Some("yes"))).unwrap(),
            PromptResult::Bool(false)
        );
    }

    #[test]
    fn select_returns_string() {
        let mut ui = MockUI::new();
        ui.set_prompt_response("script", "hello");
        let prompt = Prompt {
            key: "script".to_string(),
            question: "Which script?".to_string(),
            prompt_type: PromptType::Select { options: Vec::new() },
            default: None,
        };
        assert_eq!(
            ui.prompt(&prompt).unwrap(),
            PromptResult::String("hello".to_string())
        );
    }

    #[test]
    fn clear_resets_captures() {
        let mut ui = MockUI::new();
        ui.message("x");
        ui.install_log("Collecting x");
        ui.clear();
        assert!(ui.messages().is_empty());
        assert!(ui.install_logs().is_empty());
    }
}
