//! The annotation layer: owns the collection of notes and drives each
//! note's recording state machine through the capture protocol.

use crate::capture::{CaptureDriver, CaptureUpdate, SessionId, StopMode};
use crate::geometry::clamp_note_position;
use crate::note::{Note, NoteId, RecordingState};
use crate::notice::Notice;
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The gesture that creates a new note. Exactly one is configured; the
/// shell binds only that one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CreationGesture {
    /// Secondary click anywhere on the document surface.
    #[default]
    SecondaryClick,
    /// A dedicated "add note" control in the toolbar.
    AddButton,
}

/// Owns all notes on the document surface.
///
/// Creation order is preserved (insertion order = stacking order, last on
/// top). The layer is the only place that mutates note recording state,
/// which keeps the per-note state machine in one spot instead of spread
/// across UI callbacks.
#[derive(Debug, Default)]
pub struct AnnotationLayer {
    notes: HashMap<NoteId, Note>,
    /// Creation order, back to front.
    order: Vec<NoteId>,
    /// Pending user-facing notices, drained by the shell each frame.
    notices: Vec<Notice>,
}

impl AnnotationLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new note anchored at `desired` (container-local). Invalid
    /// coordinates are clamped, never rejected.
    pub fn create_note(&mut self, desired: Point, container: Size) -> NoteId {
        let position = clamp_note_position(desired, container, crate::note::NOTE_SIZE);
        let note = Note::new(position);
        let id = note.id();
        self.order.push(id);
        self.notes.insert(id, note);
        log::debug!("created note {id} at {position:?}");
        id
    }

    /// Remove a note: stop an in-flight capture with the discard outcome,
    /// release any attached clip, drop the note. Idempotent.
    pub fn remove_note(&mut self, id: NoteId, driver: &mut dyn CaptureDriver) {
        let Some(note) = self.notes.remove(&id) else {
            return;
        };
        self.order.retain(|n| *n != id);
        match note.state {
            RecordingState::Recording { session, .. } => {
                driver.stop(session, StopMode::Discard);
            }
            RecordingState::Saved { clip } => {
                clip.release();
            }
            RecordingState::Idle => {}
        }
        log::debug!("removed note {id}");
    }

    pub fn contains(&self, id: NoteId) -> bool {
        self.notes.contains_key(&id)
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Notes in creation order (back to front).
    pub fn notes_ordered(&self) -> impl Iterator<Item = &Note> {
        self.order.iter().filter_map(|id| self.notes.get(id))
    }

    /// Topmost note whose body contains the container-local point.
    pub fn note_at(&self, point: Point) -> Option<NoteId> {
        self.order
            .iter()
            .rev()
            .copied()
            .find(|id| self.notes.get(id).is_some_and(|note| note.hit_test(point)))
    }

    /// Move a note, clamping against the container bounds read fresh by
    /// the caller for this event.
    pub fn move_note(&mut self, id: NoteId, desired: Point, container: Size) {
        if let Some(note) = self.notes.get_mut(&id) {
            note.position = clamp_note_position(desired, container, note.size);
        }
    }

    /// Begin a capture session for a note. Re-recording releases the
    /// previous clip before the new session starts. Denial leaves the note
    /// as it was and surfaces a notice.
    pub fn begin_recording(&mut self, id: NoteId, driver: &mut dyn CaptureDriver) {
        let Some(note) = self.notes.get_mut(&id) else {
            return;
        };
        if note.state.is_recording() {
            return;
        }
        match driver.begin() {
            Ok(session) => {
                if let RecordingState::Saved { clip } = &note.state {
                    clip.release();
                }
                note.state = RecordingState::Recording {
                    session,
                    stopping: false,
                };
            }
            Err(err) => {
                log::warn!("capture denied for note {id}: {err}");
                self.notices.push(Notice::Microphone(err.to_string()));
            }
        }
    }

    /// Request finalization of a note's in-flight capture. The note stays
    /// `Recording` until the driver delivers the finalized clip.
    pub fn stop_recording(&mut self, id: NoteId, driver: &mut dyn CaptureDriver) {
        let Some(note) = self.notes.get_mut(&id) else {
            return;
        };
        if let RecordingState::Recording { session, stopping } = &mut note.state {
            if !*stopping {
                *stopping = true;
                driver.stop(*session, StopMode::Finalize);
            }
        }
    }

    /// Delete a note's recording: an in-flight capture is stopped and
    /// discarded, an attached clip is released. The note stays on the
    /// surface in `Idle`.
    pub fn delete_recording(&mut self, id: NoteId, driver: &mut dyn CaptureDriver) {
        let Some(note) = self.notes.get_mut(&id) else {
            return;
        };
        match &note.state {
            RecordingState::Recording { session, .. } => {
                driver.stop(*session, StopMode::Discard);
                note.state = RecordingState::Idle;
            }
            RecordingState::Saved { clip } => {
                clip.release();
                note.state = RecordingState::Idle;
            }
            RecordingState::Idle => {}
        }
    }

    /// The clip to play for a note. Play with no recording surfaces a
    /// notice and returns `None`.
    pub fn clip_for_playback(&mut self, id: NoteId) -> Option<crate::capture::AudioClip> {
        let note = self.notes.get(&id)?;
        match note.state.clip() {
            Some(clip) => Some(clip.clone()),
            None => {
                self.notices.push(Notice::NoRecording);
                None
            }
        }
    }

    /// Apply a completion from the driver. Completions for removed notes
    /// are ignored apart from releasing the orphaned clip; they must not
    /// panic or resurrect anything.
    pub fn apply_update(&mut self, update: CaptureUpdate) {
        match update {
            CaptureUpdate::Finished { session, clip } => {
                match self.note_for_session(session) {
                    Some(id) => {
                        // The owning note is guaranteed to be in
                        // `Recording { session }` by `note_for_session`.
                        if let Some(note) = self.notes.get_mut(&id) {
                            note.state = RecordingState::Saved { clip };
                        }
                    }
                    None => {
                        log::debug!("capture {session} finished after its note was removed");
                        clip.release();
                    }
                }
            }
            CaptureUpdate::Discarded { session } => {
                log::debug!("capture {session} discarded");
            }
            CaptureUpdate::Failed { session, error } => {
                if let Some(id) = self.note_for_session(session) {
                    if let Some(note) = self.notes.get_mut(&id) {
                        note.state = RecordingState::Idle;
                    }
                }
                self.notices.push(Notice::Microphone(error.to_string()));
            }
        }
    }

    /// The note currently recording under the given session, if any.
    pub fn note_for_session(&self, session: SessionId) -> Option<NoteId> {
        self.notes
            .values()
            .find(|note| {
                matches!(
                    note.state,
                    RecordingState::Recording { session: s, .. } if s == session
                )
            })
            .map(Note::id)
    }

    /// Surface a notice from outside the layer (document errors, etc.).
    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    /// Drain pending notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{AudioClip, CaptureError};
    use uuid::Uuid;

    const CONTAINER: Size = Size::new(800.0, 600.0);

    /// Scripted driver: records every stop request, hands out sessions,
    /// and lets tests inject completions.
    #[derive(Default)]
    struct MockDriver {
        deny_begin: bool,
        began: Vec<SessionId>,
        stopped: Vec<(SessionId, StopMode)>,
        pending: Vec<CaptureUpdate>,
    }

    impl CaptureDriver for MockDriver {
        fn begin(&mut self) -> Result<SessionId, CaptureError> {
            if self.deny_begin {
                return Err(CaptureError::NoDevice);
            }
            let session = Uuid::new_v4();
            self.began.push(session);
            Ok(session)
        }

        fn stop(&mut self, session: SessionId, mode: StopMode) {
            self.stopped.push((session, mode));
        }

        fn poll(&mut self) -> Vec<CaptureUpdate> {
            std::mem::take(&mut self.pending)
        }
    }

    fn clip() -> AudioClip {
        AudioClip::new(vec![0i16; 1600], 16_000)
    }

    #[test]
    fn test_create_clamps_out_of_bounds_point() {
        let mut layer = AnnotationLayer::new();
        let id = layer.create_note(Point::new(5000.0, 5000.0), CONTAINER);
        let note = layer.get(id).unwrap();
        assert_eq!(note.position, Point::new(600.0, 520.0));
    }

    #[test]
    fn test_creation_order_is_preserved() {
        let mut layer = AnnotationLayer::new();
        let a = layer.create_note(Point::new(0.0, 0.0), CONTAINER);
        let b = layer.create_note(Point::new(10.0, 10.0), CONTAINER);
        let ids: Vec<_> = layer.notes_ordered().map(Note::id).collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn test_note_at_prefers_topmost() {
        let mut layer = AnnotationLayer::new();
        let _bottom = layer.create_note(Point::new(100.0, 100.0), CONTAINER);
        let top = layer.create_note(Point::new(120.0, 110.0), CONTAINER);
        // Point inside both bodies: the later-created note wins.
        assert_eq!(layer.note_at(Point::new(150.0, 140.0)), Some(top));
        assert_eq!(layer.note_at(Point::new(5.0, 5.0)), None);
    }

    #[test]
    fn test_move_note_clamps() {
        let mut layer = AnnotationLayer::new();
        let id = layer.create_note(Point::new(100.0, 100.0), CONTAINER);
        layer.move_note(id, Point::new(-200.0, 700.0), CONTAINER);
        assert_eq!(layer.get(id).unwrap().position, Point::new(0.0, 520.0));
    }

    #[test]
    fn test_record_stop_attaches_clip() {
        let mut layer = AnnotationLayer::new();
        let mut driver = MockDriver::default();
        let id = layer.create_note(Point::new(0.0, 0.0), CONTAINER);

        layer.begin_recording(id, &mut driver);
        assert!(layer.get(id).unwrap().state().is_recording());
        let session = driver.began[0];

        layer.stop_recording(id, &mut driver);
        assert_eq!(driver.stopped, vec![(session, StopMode::Finalize)]);

        layer.apply_update(CaptureUpdate::Finished {
            session,
            clip: clip(),
        });
        assert!(layer.get(id).unwrap().state().has_clip());
    }

    #[test]
    fn test_repeated_stop_requests_are_deduplicated() {
        let mut layer = AnnotationLayer::new();
        let mut driver = MockDriver::default();
        let id = layer.create_note(Point::new(0.0, 0.0), CONTAINER);
        layer.begin_recording(id, &mut driver);
        layer.stop_recording(id, &mut driver);
        layer.stop_recording(id, &mut driver);
        assert_eq!(driver.stopped.len(), 1);
    }

    #[test]
    fn test_capture_denied_leaves_note_idle_with_notice() {
        let mut layer = AnnotationLayer::new();
        let mut driver = MockDriver {
            deny_begin: true,
            ..Default::default()
        };
        let id = layer.create_note(Point::new(0.0, 0.0), CONTAINER);
        layer.begin_recording(id, &mut driver);
        assert!(!layer.get(id).unwrap().state().is_recording());
        assert!(matches!(
            layer.take_notices().as_slice(),
            [Notice::Microphone(_)]
        ));
    }

    #[test]
    fn test_rerecord_releases_previous_clip_exactly_once() {
        let mut layer = AnnotationLayer::new();
        let mut driver = MockDriver::default();
        let id = layer.create_note(Point::new(0.0, 0.0), CONTAINER);

        layer.begin_recording(id, &mut driver);
        let first_session = driver.began[0];
        layer.stop_recording(id, &mut driver);
        let first_clip = clip();
        let probe = first_clip.clone();
        layer.apply_update(CaptureUpdate::Finished {
            session: first_session,
            clip: first_clip,
        });
        assert!(!probe.is_released());

        layer.begin_recording(id, &mut driver);
        assert!(probe.is_released());
        assert!(layer.get(id).unwrap().state().is_recording());
    }

    #[test]
    fn test_rerecord_denied_keeps_previous_clip() {
        let mut layer = AnnotationLayer::new();
        let mut driver = MockDriver::default();
        let id = layer.create_note(Point::new(0.0, 0.0), CONTAINER);
        layer.begin_recording(id, &mut driver);
        let session = driver.began[0];
        layer.stop_recording(id, &mut driver);
        let saved = clip();
        let probe = saved.clone();
        layer.apply_update(CaptureUpdate::Finished {
            session,
            clip: saved,
        });

        driver.deny_begin = true;
        layer.begin_recording(id, &mut driver);
        assert!(!probe.is_released());
        assert!(layer.get(id).unwrap().state().has_clip());
    }

    #[test]
    fn test_delete_while_recording_discards_and_goes_idle() {
        let mut layer = AnnotationLayer::new();
        let mut driver = MockDriver::default();
        let id = layer.create_note(Point::new(0.0, 0.0), CONTAINER);
        layer.begin_recording(id, &mut driver);
        let session = driver.began[0];

        layer.delete_recording(id, &mut driver);
        assert_eq!(driver.stopped, vec![(session, StopMode::Discard)]);
        let state = layer.get(id).unwrap().state();
        assert!(!state.is_recording());
        assert!(!state.has_clip());
    }

    #[test]
    fn test_delete_releases_saved_clip() {
        let mut layer = AnnotationLayer::new();
        let mut driver = MockDriver::default();
        let id = layer.create_note(Point::new(0.0, 0.0), CONTAINER);
        layer.begin_recording(id, &mut driver);
        let session = driver.began[0];
        layer.stop_recording(id, &mut driver);
        let saved = clip();
        let probe = saved.clone();
        layer.apply_update(CaptureUpdate::Finished {
            session,
            clip: saved,
        });

        layer.delete_recording(id, &mut driver);
        assert!(probe.is_released());
        assert!(!layer.get(id).unwrap().state().has_clip());
    }

    #[test]
    fn test_remove_while_recording_requests_discard() {
        let mut layer = AnnotationLayer::new();
        let mut driver = MockDriver::default();
        let id = layer.create_note(Point::new(0.0, 0.0), CONTAINER);
        layer.begin_recording(id, &mut driver);
        let session = driver.began[0];

        layer.remove_note(id, &mut driver);
        assert!(!layer.contains(id));
        assert_eq!(driver.stopped, vec![(session, StopMode::Discard)]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut layer = AnnotationLayer::new();
        let mut driver = MockDriver::default();
        let id = layer.create_note(Point::new(0.0, 0.0), CONTAINER);
        layer.remove_note(id, &mut driver);
        layer.remove_note(id, &mut driver);
        assert!(layer.is_empty());
        assert!(driver.stopped.is_empty());
    }

    #[test]
    fn test_stale_completion_after_removal_is_ignored() {
        let mut layer = AnnotationLayer::new();
        let mut driver = MockDriver::default();
        let id = layer.create_note(Point::new(0.0, 0.0), CONTAINER);
        layer.begin_recording(id, &mut driver);
        let session = driver.began[0];
        layer.remove_note(id, &mut driver);

        let orphan = clip();
        let probe = orphan.clone();
        layer.apply_update(CaptureUpdate::Finished {
            session,
            clip: orphan,
        });
        // No panic, the note stays absent, and the orphaned clip is
        // released rather than leaked.
        assert!(!layer.contains(id));
        assert!(probe.is_released());
    }

    #[test]
    fn test_removed_while_recording_never_reaches_saved() {
        let mut layer = AnnotationLayer::new();
        let mut driver = MockDriver::default();
        let id = layer.create_note(Point::new(0.0, 0.0), CONTAINER);
        layer.begin_recording(id, &mut driver);
        let session = driver.began[0];
        layer.delete_recording(id, &mut driver);

        // A finalize racing the discard: the session no longer maps to a
        // recording note, so the clip must not attach.
        layer.apply_update(CaptureUpdate::Finished {
            session,
            clip: clip(),
        });
        assert!(!layer.get(id).unwrap().state().has_clip());
    }

    #[test]
    fn test_play_without_recording_emits_notice() {
        let mut layer = AnnotationLayer::new();
        let id = layer.create_note(Point::new(0.0, 0.0), CONTAINER);
        assert!(layer.clip_for_playback(id).is_none());
        assert_eq!(layer.take_notices(), vec![Notice::NoRecording]);
        // State unchanged.
        assert!(!layer.get(id).unwrap().state().has_clip());
    }

    #[test]
    fn test_failed_session_returns_note_to_idle() {
        let mut layer = AnnotationLayer::new();
        let mut driver = MockDriver::default();
        let id = layer.create_note(Point::new(0.0, 0.0), CONTAINER);
        layer.begin_recording(id, &mut driver);
        let session = driver.began[0];

        layer.apply_update(CaptureUpdate::Failed {
            session,
            error: CaptureError::Backend("device unplugged".into()),
        });
        assert!(!layer.get(id).unwrap().state().is_recording());
        assert!(matches!(
            layer.take_notices().as_slice(),
            [Notice::Microphone(_)]
        ));
    }
}
