//! Voice-note widget definitions.

use crate::capture::{AudioClip, SessionId};
use kurbo::{Point, Rect, Size};
use uuid::Uuid;

/// Unique identifier for notes.
pub type NoteId = Uuid;

/// On-screen extent of a note card.
pub const NOTE_SIZE: Size = Size::new(200.0, 80.0);

/// Recording lifecycle of a single note.
///
/// `Idle` -> `Recording` -> `Saved` -> back to `Recording` on re-record
/// (the previous clip is released first) or -> `Idle` on delete.
#[derive(Debug)]
pub enum RecordingState {
    /// No recording and no attached clip.
    Idle,
    /// A capture session is in progress.
    Recording {
        session: SessionId,
        /// Set once a stop has been requested, so repeated activations of
        /// the stop control don't issue duplicate stop requests.
        stopping: bool,
    },
    /// A finalized clip is attached and playable.
    Saved { clip: AudioClip },
}

impl RecordingState {
    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording { .. })
    }

    pub fn has_clip(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }

    /// The attached clip, if any.
    pub fn clip(&self) -> Option<&AudioClip> {
        match self {
            Self::Saved { clip } => Some(clip),
            _ => None,
        }
    }
}

/// A single draggable voice-annotation widget anchored on the document
/// surface. The note exclusively owns its clip; the layer releases it on
/// deletion or replacement.
#[derive(Debug)]
pub struct Note {
    id: NoteId,
    /// Anchor position in container-local coordinates (top-left corner),
    /// always clamped inside the container.
    pub position: Point,
    pub size: Size,
    pub(crate) state: RecordingState,
}

impl Note {
    pub fn new(position: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            size: NOTE_SIZE,
            state: RecordingState::Idle,
        }
    }

    pub fn id(&self) -> NoteId {
        self.id
    }

    pub fn state(&self) -> &RecordingState {
        &self.state
    }

    /// Bounding box in container-local coordinates.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    /// Check whether a container-local point hits the note body.
    pub fn hit_test(&self, point: Point) -> bool {
        self.bounds().contains(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_note_is_idle() {
        let note = Note::new(Point::new(10.0, 20.0));
        assert!(!note.state().is_recording());
        assert!(!note.state().has_clip());
        assert!(note.state().clip().is_none());
    }

    #[test]
    fn test_hit_test_uses_bounds() {
        let note = Note::new(Point::new(100.0, 100.0));
        assert!(note.hit_test(Point::new(150.0, 140.0)));
        assert!(!note.hit_test(Point::new(99.0, 100.0)));
        assert!(!note.hit_test(Point::new(150.0, 181.0)));
    }
}
