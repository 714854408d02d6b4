//! Translates high-level UI gestures into annotation-layer operations.
//!
//! Owns the single drag controller; the container rectangle is passed in
//! fresh for every call because the document surface scrolls and resizes
//! between events.

use kurbo::{Point, Rect};
use vocamark_core::geometry::window_to_container;
use vocamark_core::{AnnotationLayer, CaptureDriver, DragController, NoteId};

pub struct EventHandler {
    drag: DragController,
}

impl EventHandler {
    pub fn new() -> Self {
        Self {
            drag: DragController::new(),
        }
    }

    /// Create a note from a pointer gesture, converting the window-space
    /// point into container-local coordinates.
    pub fn create_at(
        &self,
        layer: &mut AnnotationLayer,
        window_point: Point,
        container: Rect,
    ) -> NoteId {
        let local = window_to_container(window_point, container.origin());
        layer.create_note(local, container.size())
    }

    /// Begin dragging a note from a press on its body.
    pub fn begin_drag(
        &mut self,
        layer: &AnnotationLayer,
        note: NoteId,
        window_point: Point,
        container: Rect,
    ) {
        let Some(current) = layer.get(note) else {
            return;
        };
        let local = window_to_container(window_point, container.origin());
        self.drag.begin(note, local, current.position);
    }

    /// Move the active drag to the pointer, clamped to the container.
    pub fn drag_to(&mut self, layer: &mut AnnotationLayer, window_point: Point, container: Rect) {
        let local = window_to_container(window_point, container.origin());
        if let Some((note, desired)) = self.drag.update(local) {
            layer.move_note(note, desired, container.size());
        }
    }

    pub fn end_drag(&mut self) {
        self.drag.end();
    }

    /// Remove a note, cancelling its drag if it was mid-drag.
    pub fn remove_note(
        &mut self,
        layer: &mut AnnotationLayer,
        driver: &mut dyn CaptureDriver,
        note: NoteId,
    ) {
        self.drag.cancel_if(note);
        layer.remove_note(note, driver);
    }

    /// The note currently mid-drag, if any (rendered translucent).
    pub fn dragging(&self) -> Option<NoteId> {
        self.drag.active_note()
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}
