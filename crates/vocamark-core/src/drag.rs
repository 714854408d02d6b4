//! Drag interaction for note widgets.
//!
//! One controller owned by the shell tracks which note (if any) is being
//! dragged, instead of per-note listeners. Drag state is exclusive: at
//! most one note is mid-drag process-wide.

use crate::note::NoteId;
use kurbo::{Point, Vec2};

/// State of an active drag.
#[derive(Debug, Clone, Copy)]
pub struct DragState {
    /// The note being dragged.
    pub note: NoteId,
    /// Pointer offset from the note's top-left corner at press time.
    pub grab_offset: Vec2,
}

/// Tracks the single active drag.
#[derive(Debug, Default)]
pub struct DragController {
    active: Option<DragState>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin dragging a note. Returns `false` (and changes nothing) if a
    /// drag is already active.
    pub fn begin(&mut self, note: NoteId, pointer: Point, note_position: Point) -> bool {
        if self.active.is_some() {
            return false;
        }
        self.active = Some(DragState {
            note,
            grab_offset: pointer - note_position,
        });
        true
    }

    /// The desired (unclamped) note position for the current pointer
    /// location, or `None` when the pointer's note isn't the active drag.
    pub fn update(&self, pointer: Point) -> Option<(NoteId, Point)> {
        self.active
            .map(|drag| (drag.note, pointer - drag.grab_offset))
    }

    /// End the drag, returning the note that was dragged.
    pub fn end(&mut self) -> Option<NoteId> {
        self.active.take().map(|drag| drag.note)
    }

    /// Drop the drag if it belongs to a removed note.
    pub fn cancel_if(&mut self, note: NoteId) {
        if self.active.is_some_and(|drag| drag.note == note) {
            self.active = None;
        }
    }

    pub fn active_note(&self) -> Option<NoteId> {
        self.active.map(|drag| drag.note)
    }

    pub fn is_dragging(&self, note: NoteId) -> bool {
        self.active_note() == Some(note)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_drag_applies_grab_offset() {
        let mut drag = DragController::new();
        let note = Uuid::new_v4();
        assert!(drag.begin(note, Point::new(130.0, 120.0), Point::new(100.0, 100.0)));

        let (id, desired) = drag.update(Point::new(230.0, 170.0)).unwrap();
        assert_eq!(id, note);
        assert_eq!(desired, Point::new(200.0, 150.0));
    }

    #[test]
    fn test_second_drag_is_refused_while_active() {
        let mut drag = DragController::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert!(drag.begin(a, Point::new(10.0, 10.0), Point::new(0.0, 0.0)));
        assert!(!drag.begin(b, Point::new(50.0, 50.0), Point::new(40.0, 40.0)));

        // Moves keep tracking the first note, with its offset.
        let (id, desired) = drag.update(Point::new(20.0, 20.0)).unwrap();
        assert_eq!(id, a);
        assert_eq!(desired, Point::new(10.0, 10.0));
    }

    #[test]
    fn test_end_clears_active_drag() {
        let mut drag = DragController::new();
        let note = Uuid::new_v4();
        drag.begin(note, Point::new(0.0, 0.0), Point::new(0.0, 0.0));
        assert_eq!(drag.end(), Some(note));
        assert!(drag.update(Point::new(5.0, 5.0)).is_none());
        assert_eq!(drag.end(), None);
    }

    #[test]
    fn test_cancel_if_only_drops_matching_note() {
        let mut drag = DragController::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        drag.begin(a, Point::new(0.0, 0.0), Point::new(0.0, 0.0));
        drag.cancel_if(b);
        assert!(drag.is_dragging(a));
        drag.cancel_if(a);
        assert_eq!(drag.active_note(), None);
    }
}
