//! Vocamark Core Library
//!
//! Platform-agnostic data structures and logic for the voice-note
//! annotation layer: note lifecycle, drag interaction, and the
//! capture protocol the audio driver implements.

pub mod capture;
pub mod drag;
pub mod geometry;
pub mod layer;
pub mod note;
pub mod notice;

pub use capture::{AudioClip, CaptureDriver, CaptureError, CaptureUpdate, SessionId, StopMode};
pub use drag::{DragController, DragState};
pub use layer::{AnnotationLayer, CreationGesture};
pub use note::{Note, NoteId, RecordingState, NOTE_SIZE};
pub use notice::Notice;
