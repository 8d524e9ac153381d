//! Output verbosity.

use std::str::FromStr;

/// Output verbosity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Narration plus dispatcher detail.
    Verbose,
    /// Narration and status.
    #[default]
    Normal,
    /// Status lines only (header, summary, warnings).
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

impl OutputMode {
    /// Check if this mode shows verbose detail.
    pub fn shows_verbose(&self) -> bool {
        matches!(self, Self::Verbose)
    }

    /// Check if this mode shows narration lines.
    pub fn shows_narration(&self) -> bool {
        matches!(self, Self::Verbose | Self::Normal)
    }

    /// Check if this mode shows status messages.
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
        assert!("invalid".parse::<OutputMode>().is_err());
    }

    #[test]
    fn output_mode_shows_verbose() {
        assert!(OutputMode::Verbose.shows_verbose());
        assert!(!OutputMode::Normal.shows_verbose());
        assert!(!OutputMode::Quiet.shows_verbose());
        assert!(!OutputMode::Silent.shows_verbose());
    }

    #[test]
    fn output_mode_shows_narration() {
        assert!(OutputMode::Verbose.shows_narration());
        assert!(OutputMode::Normal.shows_narration());
        assert!(!OutputMode::Quiet.shows_narration());
        assert!(!OutputMode::Silent.shows_narration());
    }

    #[test]
    fn output_mode_shows_status() {
        assert!(OutputMode::Quiet.shows_status());
        assert!(!OutputMode::Silent.shows_status());
    }

    #[test]
    fn default_is_normal() {
        assert_eq!(OutputMode::default(), OutputMode::Normal);
    }
}
