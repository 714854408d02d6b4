//! User-facing notices.

use std::fmt;

/// A transient, non-fatal message for the user. The shell renders these as
/// toasts; nothing in the system escalates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Play was activated on a note with no attached recording.
    NoRecording,
    /// The microphone could not be acquired or the stream died.
    Microphone(String),
    /// The document surface reported a problem (unopenable file, failed
    /// page render).
    Surface(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::NoRecording => write!(f, "No recording yet"),
            Notice::Microphone(reason) => write!(f, "Microphone unavailable: {reason}"),
            Notice::Surface(reason) => write!(f, "Document error: {reason}"),
        }
    }
}
