//! Interactive prompts.

use console::{style, Term};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Select};

use crate::error::{Result, ScriptoriumError};

use super::{parse_confirm, Prompt, PromptOption, PromptResult, PromptType};

fn map_dialoguer_err(e: dialoguer::Error) -> ScriptoriumError {
    ScriptoriumError::Io(e.into())
}

/// Dialoguer theme without the default yellow `?` prefix.
fn prompt_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("".to_string()),
        ..ColorfulTheme::default()
    }
}

/// Prompt the user for input.
pub fn prompt_user(prompt: &Prompt, term: &Term) -> Result<PromptResult> {
    match &prompt.prompt_type {
        PromptType::Confirm => prompt_confirm(prompt, term),
        PromptType::Select { options } => prompt_select(prompt, options, term),
    }
}

fn prompt_confirm(prompt: &Prompt, term: &Term) -> Result<PromptResult> {
    let default = prompt
        .default
        .as_deref()
        .map(parse_confirm)
        .unwrap_or(true);

    let result = Confirm::with_theme(&prompt_theme())
        .with_prompt(&prompt.question)
        .default(default)
        .interact_on(term)
        .map_err(map_dialoguer_err)?;

    Ok(PromptResult::Bool(result))
}

fn prompt_select(prompt: &Prompt, options: &[PromptOption], term: &Term) -> Result<PromptResult> {
    let labels: Vec<_> = options.iter().map(|o| o.label.as_str()).collect();

    let selection = Select::with_theme(&prompt_theme())
        .with_prompt(&prompt.question)
        .items(&labels)
        .default(default_index(prompt, options))
        .interact_on(term)
        .map_err(map_dialoguer_err)?;

    options
        .get(selection)
        .map(|o| PromptResult::String(o.value.clone()))
        .ok_or_else(|| ScriptoriumError::ConfigValidationError {
            message: format!("No option at position {} for '{}'", selection, prompt.key),
        })
}

/// Position of the prompt default among `options`, or the first one.
fn default_index(prompt: &Prompt, options: &[PromptOption]) -> usize {
    prompt
        .default
        .as_ref()
        .and_then(|d| options.iter().position(|o| o.value == *d))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<PromptOption> {
        ["hello", "report"]
            .iter()
            .map(|v| PromptOption {
                label: format!("Tools / {}", v),
                value: v.to_string(),
            })
            .collect()
    }

    fn select(default: Option<&str>) -> Prompt {
        Prompt {
            key: "script".to_string(),
            question: "Run which script?".to_string(),
            prompt_type: PromptType::Select { options: options() },
            default: default.map(String::from),
        }
    }

    #[test]
    fn select_default_is_found_by_value() {
        assert_eq!(default_index(&select(Some("report")), &options()), 1);
    }

    #[test]
    fn select_default_falls_back_to_first() {
        assert_eq!(default_index(&select(None), &options()), 0);
        assert_eq!(default_index(&select(Some("missing")), &options()), 0);
    }
}
