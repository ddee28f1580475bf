//! Output verbosity.

use std::str::FromStr;

/// Output verbosity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Everything, including installer output and every status change.
    Verbose,
    /// Script output, installer output, notices and status changes.
    #[default]
    Normal,
    /// Script output and notices only.
    Quiet,
    /// Nothing except errors.
    Silent,
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "verbose" => Ok(Self::Verbose),
            "normal" => Ok(Self::Normal),
            "quiet" => Ok(Self::Quiet),
            "silent" => Ok(Self::Silent),
            _ => Err(format!("unknown output mode: {}", s)),
        }
    }
}

impl From<crate::config::schema::OutputMode> for OutputMode {
    fn from(config_mode: crate::config::schema::OutputMode) -> Self {
        match config_mode {
            crate::config::schema::OutputMode::Verbose => Self::Verbose,
            crate::config::schema::OutputMode::Quiet => Self::Quiet,
            crate::config::schema::OutputMode::Silent => Self::Silent,
        }
    }
}

impl OutputMode {
    /// Whether script output is relayed.
    pub fn shows_script_output(&self) -> bool {
        !matches!(self, Self::Silent)
    }

    /// Whether package-manager output is relayed.
    pub fn shows_install_log(&self) -> bool {
        matches!(self, Self::Verbose | Self::Normal)
    }

    /// Whether status transitions are announced.
    pub fn shows_transitions(&self) -> bool {
        matches!(self, Self::Verbose | Self::Normal)
    }

    /// Whether messages, successes and warnings are shown.
    pub fn shows_status(&self) -> bool {
        !matches!(self, Self::Silent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_mode_from_str() {
        assert_eq!("verbose".parse::<OutputMode>(), Ok(OutputMode::Verbose));
        assert_eq!("QUIET".parse::<OutputMode>(), Ok(OutputMode::Quiet));
        assert!("loud".parse::<OutputMode>().is_err());
    }

    #[test]
    fn script_output_hidden_only_when_silent() {
        assert!(OutputMode::Verbose.shows_script_output());
        assert!(OutputMode::Quiet.shows_script_output());
        assert!(!OutputMode::Silent.shows_script_output());
    }

    #[test]
    fn install_log_and_transitions_need_normal_or_verbose() {
        assert!(OutputMode::Normal.shows_install_log());
        assert!(!OutputMode::Quiet.shows_install_log());
        assert!(OutputMode::Verbose.shows_transitions());
        assert!(!OutputMode::Silent.shows_transitions());
    }

    #[test]
    fn output_mode_default_is_normal() {
        assert_eq!(OutputMode::default(), OutputMode::Normal);
    }

    #[test]
    fn from_config_modes() {
        use crate::config::schema::OutputMode as ConfigMode;
        assert_eq!(OutputMode::from(ConfigMode::Verbose), OutputMode::Verbose);
        assert_eq!(OutputMode::from(ConfigMode::Quiet), OutputMode::Quiet);
        assert_eq!(OutputMode::from(ConfigMode::Silent), OutputMode::Silent);
    }
}
