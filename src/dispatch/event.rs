//! Narration events published through a dispatcher.

use std::fmt;

/// A progress notification emitted while a plan runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Plain narration shown in normal output.
    Message { message: String },

    /// Narration shown only in verbose output.
    Verbose { message: String },

    /// A dispatcher operation is about to touch `targets`.
    ActionStarted {
        description: String,
        targets: Vec<String>,
    },

    /// A dispatcher operation has finished.
    ActionFinished {
        description: String,
        succeeded: usize,
        failed: usize,
    },
}

impl Event {
    /// Build a [`Event::Message`].
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }

    /// Build a [`Event::Verbose`].
    pub fn verbose(message: impl Into<String>) -> Self {
        Self::Verbose {
            message: message.into(),
        }
    }

    /// Whether this event is plain narration (message or verbose).
    pub fn is_narration(&self) -> bool {
        matches!(self, Self::Message { .. } | Self::Verbose { .. })
    }

    /// Narration text, if this is a message or verbose event.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Message { message } | Self::Verbose { message } => Some(message),
            _ => None,
        }
    }

    /// Return the event with `suffix` appended to its narration text.
    ///
    /// Events that are not narration come back unchanged.
    pub fn with_suffix(self, suffix: &str) -> Self {
        match self {
            Self::Message { message } => Self::Message {
                message: format!("{}{}", message, suffix),
            },
            Self::Verbose { message } => Self::Verbose {
                message: format!("{}{}", message, suffix),
            },
            other => other,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message { message } | Self::Verbose { message } => write!(f, "{}", message),
            Self::ActionStarted {
                description,
                targets,
            } => write!(f, "Starting: {} on {}", description, targets.join(", ")),
            Self::ActionFinished {
                description,
                succeeded,
                failed,
            } => write!(
                f,
                "Finished: {} with {} failure(s) on {} target(s)",
                description,
                failed,
                succeeded + failed
            ),
        }
    }
}
