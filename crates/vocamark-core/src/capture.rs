//! The two-phase capture protocol between the annotation layer and the
//! platform audio driver.
//!
//! `begin` starts a session and fails synchronously when the capability is
//! unavailable. `stop` requests completion with either a finalize or a
//! discard outcome. Completions are delivered asynchronously through
//! `poll` and may arrive after the owning note has been removed; the layer
//! guards on liveness before acting on them.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a capture session.
pub type SessionId = Uuid;

/// Capture errors. All of them are local and user-facing: they surface as
/// a notice and leave the note in its previous state.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no audio input device available")]
    NoDevice,
    #[error("failed to start capture stream: {0}")]
    Stream(String),
    #[error("audio backend error: {0}")]
    Backend(String),
}

/// Requested outcome when stopping a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopMode {
    /// Finalize the buffered chunks into a playable clip.
    Finalize,
    /// Drop the buffered chunks; no partial recording is ever exposed.
    Discard,
}

/// Completion message from the driver.
#[derive(Debug)]
pub enum CaptureUpdate {
    /// A session was finalized into a playable clip.
    Finished { session: SessionId, clip: AudioClip },
    /// A session was stopped with the discard outcome.
    Discarded { session: SessionId },
    /// A session died (device unplugged, stream error).
    Failed { session: SessionId, error: CaptureError },
}

/// Driver side of the capture protocol.
///
/// Implemented by the cpal driver in the application shell and by mock
/// drivers in tests.
pub trait CaptureDriver {
    /// Start a capture session. Capability denial is reported here,
    /// synchronously, and the caller does not retry.
    fn begin(&mut self) -> Result<SessionId, CaptureError>;

    /// Request completion of a session. Unknown sessions are ignored.
    fn stop(&mut self, session: SessionId, mode: StopMode);

    /// Drain pending completions. Called once per event-loop turn.
    fn poll(&mut self) -> Vec<CaptureUpdate>;
}

/// A finalized recording: mono PCM samples behind a release-once handle.
///
/// Clones share the same underlying buffer, so a clip handed to playback
/// observes a later release and refuses to keep playing. Releasing twice
/// is a guarded no-op.
#[derive(Debug, Clone)]
pub struct AudioClip {
    inner: Arc<ClipInner>,
}

#[derive(Debug)]
struct ClipInner {
    samples: Vec<i16>,
    sample_rate: u32,
    released: AtomicBool,
}

impl AudioClip {
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            inner: Arc::new(ClipInner {
                samples,
                sample_rate,
                released: AtomicBool::new(false),
            }),
        }
    }

    /// The samples, or `None` once the clip has been released.
    pub fn samples(&self) -> Option<&[i16]> {
        if self.is_released() {
            None
        } else {
            Some(&self.inner.samples)
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.inner.sample_rate
    }

    /// Recorded duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.inner.samples.len() as f64 / self.inner.sample_rate as f64
    }

    pub fn is_released(&self) -> bool {
        self.inner.released.load(Ordering::Acquire)
    }

    /// Release the underlying resource. Returns `true` if this call
    /// performed the release, `false` if it had already happened.
    pub fn release(&self) -> bool {
        let first = !self.inner.released.swap(true, Ordering::AcqRel);
        if !first {
            log::warn!("audio clip released twice");
        }
        first
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_release_is_once() {
        let clip = AudioClip::new(vec![0i16; 16_000], 16_000);
        assert!(!clip.is_released());
        assert!(clip.release());
        assert!(!clip.release());
        assert!(clip.is_released());
    }

    #[test]
    fn test_released_clip_hides_samples_from_all_handles() {
        let clip = AudioClip::new(vec![1, 2, 3], 8_000);
        let playback_handle = clip.clone();
        assert_eq!(playback_handle.samples(), Some(&[1i16, 2, 3][..]));
        clip.release();
        assert_eq!(playback_handle.samples(), None);
    }

    #[test]
    fn test_clip_duration() {
        let clip = AudioClip::new(vec![0i16; 24_000], 16_000);
        assert!((clip.duration_secs() - 1.5).abs() < f64::EPSILON);
    }
}
