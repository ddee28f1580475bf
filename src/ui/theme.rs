//! Visual theme and styling.

use crate::supervisor::ScriptStatus;
use console::Style;

/// Visual theme for terminal output.
#[derive(Debug, Clone)]
pub struct ScriptoriumTheme {
    /// Style for success messages (green).
    pub success: Style,
    /// Style for warning messages (orange).
    pub warning: Style,
    /// Style for error messages (red bold).
    pub error: Style,
    /// Style for running elements (magenta).
    pub info: Style,
    /// Style for dim/secondary text.
    pub dim: Style,
    /// Style for highlighted/important text (bold).
    pub highlight: Style,
    /// Style for headers (magenta bold).
    pub header: Style,
    /// Style for script key prefixes on relayed output (cyan).
    pub key: Style,
    /// Style for installer output (dim).
    pub install: Style,
}

impl Default for ScriptoriumTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptoriumTheme {
    /// Create the default colored theme.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            info: Style::new().magenta(),
            dim: Style::new().dim(),
            highlight: Style::new().bold(),
            header: Style::new().bold().magenta(),
            key: Style::new().cyan(),
            install: Style::new().dim(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            info: Style::new(),
            dim: Style::new(),
            highlight: Style::new(),
            header: Style::new(),
            key: Style::new(),
            install: Style::new(),
        }
    }

    /// Format a success message (icon + text in green).
    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    /// Format a warning message (icon + text in orange).
    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    /// Format an error message (icon + text in red bold).
    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    /// Format a header banner.
    pub fn format_header(&self, title: &str) -> String {
        format!("{}", self.header.apply_to(title))
    }

    /// Prefix every line of a script's output with its key.
    pub fn format_output(&self, key: &str, text: &str) -> String {
        let prefix = self.key.apply_to(format!("[{}]", key)).to_string();
        text.split('\n')
            .map(|line| format!("{} {}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Format a status transition with its icon.
    pub fn format_status(&self, key: &str, status: ScriptStatus) -> String {
        let style = match status {
            ScriptStatus::Finished => &self.success,
            ScriptStatus::Failed => &self.error,
            ScriptStatus::Stopped => &self.warning,
            ScriptStatus::Running => &self.info,
            ScriptStatus::Idle => &self.dim,
        };
        format!(
            "{} {} {}",
            style.apply_to(status.display_char()),
            self.highlight.apply_to(key),
            self.dim.apply_to(status)
        )
    }

    /// Format one line of installer output.
    pub fn format_install(&self, text: &str) -> String {
        text.split('\n')
            .map(|line| format!("  {}", self.install.apply_to(line)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    console::Term::stdout().is_term()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_formats_notices() {
        let theme = ScriptoriumTheme::plain();
        assert_eq!(theme.format_success("Complete"), "✓ Complete");
        assert_eq!(theme.format_warning("Caution"), "⚠ Caution");
        assert_eq!(theme.format_error("Failed"), "✗ Failed");
    }

    #[test]
    fn output_lines_are_prefixed() {
        let theme = ScriptoriumTheme::plain();
        assert_eq!(theme.format_output("hello", "a\nb"), "[hello] a\n[hello] b");
    }

    #[test]
    fn status_line_has_icon_key_and_word() {
        let theme = ScriptoriumTheme::plain();
        assert_eq!(
            theme.format_status("hello", ScriptStatus::Finished),
            "✓ hello finished"
        );
    }

    #[test]
    fn install_lines_are_indented() {
        let theme = ScriptoriumTheme::plain();
        assert_eq!(theme.format_install("Collecting x"), "  Collecting x");
    }

    #[test]
    fn default_impl_matches_new() {
        let default = ScriptoriumTheme::default();
        let new = ScriptoriumTheme::new();
        assert_eq!(default.format_success("test"), new.format_success("test"));
    }
}
