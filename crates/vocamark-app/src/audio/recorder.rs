//! cpal capture driver.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use hound::{WavSpec, WavWriter};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use vocamark_core::{AudioClip, CaptureDriver, CaptureError, CaptureUpdate, SessionId, StopMode};

/// One in-flight capture session. Dropping the stream stops the device.
struct ActiveCapture {
    stream: cpal::Stream,
    buffer: Arc<Mutex<Vec<i16>>>,
    sample_rate: u32,
    /// Set by the error callback when the stream dies mid-capture.
    failure: Arc<Mutex<Option<String>>>,
}

/// Capture driver over the default cpal input device.
///
/// Samples arrive as f32 on the audio thread and are accumulated as i16
/// mono; `stop` finalizes or discards the buffer synchronously and queues
/// the completion for the next `poll`.
#[derive(Default)]
pub struct CpalCaptureDriver {
    active: HashMap<SessionId, ActiveCapture>,
    pending: Vec<CaptureUpdate>,
}

impl CpalCaptureDriver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CaptureDriver for CpalCaptureDriver {
    fn begin(&mut self) -> Result<SessionId, CaptureError> {
        let host = cpal::default_host();
        let device = host.default_input_device().ok_or(CaptureError::NoDevice)?;
        let config = device
            .default_input_config()
            .map_err(|e| CaptureError::Stream(e.to_string()))?;
        let sample_rate = config.sample_rate().0;
        let channels = config.channels() as usize;

        let buffer = Arc::new(Mutex::new(Vec::new()));
        let failure = Arc::new(Mutex::new(None));
        let buffer_cb = Arc::clone(&buffer);
        let failure_cb = Arc::clone(&failure);

        let stream = device
            .build_input_stream(
                &config.into(),
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = buffer_cb.lock() {
                        // Downmix interleaved frames to mono i16.
                        for frame in data.chunks(channels.max(1)) {
                            let mono: f32 =
                                frame.iter().sum::<f32>() / channels.max(1) as f32;
                            buf.push((mono * i16::MAX as f32) as i16);
                        }
                    }
                },
                move |err| {
                    log::error!("capture stream error: {err}");
                    if let Ok(mut failure) = failure_cb.lock() {
                        failure.get_or_insert_with(|| err.to_string());
                    }
                },
                None,
            )
            .map_err(|e| CaptureError::Stream(e.to_string()))?;

        stream
            .play()
            .map_err(|e| CaptureError::Stream(e.to_string()))?;

        let session = Uuid::new_v4();
        log::info!("capture session {session} started ({sample_rate} Hz, {channels} ch)");
        self.active.insert(
            session,
            ActiveCapture {
                stream,
                buffer,
                sample_rate,
                failure,
            },
        );
        Ok(session)
    }

    fn stop(&mut self, session: SessionId, mode: StopMode) {
        let Some(capture) = self.active.remove(&session) else {
            return;
        };
        drop(capture.stream);

        match mode {
            StopMode::Finalize => {
                let samples = capture
                    .buffer
                    .lock()
                    .map(|mut buf| std::mem::take(&mut *buf))
                    .unwrap_or_default();
                log::info!(
                    "capture session {session} finalized ({} samples)",
                    samples.len()
                );
                self.pending.push(CaptureUpdate::Finished {
                    session,
                    clip: AudioClip::new(samples, capture.sample_rate),
                });
            }
            StopMode::Discard => {
                log::info!("capture session {session} discarded");
                self.pending.push(CaptureUpdate::Discarded { session });
            }
        }
    }

    fn poll(&mut self) -> Vec<CaptureUpdate> {
        let dead: Vec<SessionId> = self
            .active
            .iter()
            .filter(|(_, capture)| {
                capture
                    .failure
                    .lock()
                    .map(|f| f.is_some())
                    .unwrap_or(false)
            })
            .map(|(session, _)| *session)
            .collect();
        for session in dead {
            if let Some(capture) = self.active.remove(&session) {
                let reason = capture
                    .failure
                    .lock()
                    .ok()
                    .and_then(|mut f| f.take())
                    .unwrap_or_else(|| "stream died".into());
                self.pending.push(CaptureUpdate::Failed {
                    session,
                    error: CaptureError::Backend(reason),
                });
            }
        }
        std::mem::take(&mut self.pending)
    }
}

/// Write a finalized clip to a WAV file (mono, 16-bit PCM). Debug
/// facility behind the `--dump-audio` flag; failures are logged, never
/// propagated.
pub fn dump_clip_wav(clip: &AudioClip, path: &Path) {
    let Some(samples) = clip.samples() else {
        return;
    };
    let spec = WavSpec {
        channels: 1,
        sample_rate: clip.sample_rate(),
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let result = WavWriter::create(path, spec).and_then(|mut writer| {
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()
    });
    match result {
        Ok(()) => log::info!("dumped recording to {}", path.display()),
        Err(e) => log::error!("failed to dump recording to {}: {e}", path.display()),
    }
}
