//! Audio capture and playback
//!
//! cpal-backed implementation of the core capture protocol, plus clip
//! playback. Audio callbacks run on cpal's thread and talk to the UI
//! thread only through shared atomics and buffers drained in `poll`.

mod playback;
mod recorder;

pub use playback::ClipPlayer;
pub use recorder::{dump_clip_wav, CpalCaptureDriver};
