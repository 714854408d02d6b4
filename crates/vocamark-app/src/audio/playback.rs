//! Clip playback over the default cpal output device.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use vocamark_core::AudioClip;

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("no audio output device available")]
    NoDevice,
    #[error("failed to start playback stream: {0}")]
    Stream(String),
}

/// Source position in 16.16 fixed point, stepped by `clip_rate/out_rate`
/// per output frame for naive nearest-sample rate conversion.
struct PlayerShared {
    playing: AtomicBool,
    position: AtomicU64,
}

/// Plays one note's clip. The stream is built lazily on the first play
/// and kept alive; pause gates the callback with an atomic. A clip
/// released mid-play (deleted from another control) silences and stops
/// the player instead of reading freed audio.
pub struct ClipPlayer {
    clip: AudioClip,
    stream: Option<cpal::Stream>,
    shared: Arc<PlayerShared>,
}

impl ClipPlayer {
    pub fn new(clip: AudioClip) -> Self {
        Self {
            clip,
            stream: None,
            shared: Arc::new(PlayerShared {
                playing: AtomicBool::new(false),
                position: AtomicU64::new(0),
            }),
        }
    }

    /// Whether this player's clip has been released (player is stale).
    pub fn clip_released(&self) -> bool {
        self.clip.is_released()
    }

    pub fn is_playing(&self) -> bool {
        self.shared.playing.load(Ordering::Acquire)
    }

    /// Start or resume playback. Playback that ran to the end restarts
    /// from the beginning.
    pub fn play(&mut self) -> Result<(), PlaybackError> {
        let Some(samples) = self.clip.samples() else {
            return Ok(());
        };
        let finished =
            (self.shared.position.load(Ordering::Acquire) >> 16) as usize >= samples.len();
        if finished {
            self.shared.position.store(0, Ordering::Release);
        }

        if self.stream.is_none() {
            self.stream = Some(self.build_stream()?);
        }
        self.shared.playing.store(true, Ordering::Release);
        if let Some(stream) = &self.stream {
            stream
                .play()
                .map_err(|e| PlaybackError::Stream(e.to_string()))?;
        }
        Ok(())
    }

    /// Pause playback; no-op when not playing.
    pub fn pause(&mut self) {
        self.shared.playing.store(false, Ordering::Release);
    }

    fn build_stream(&self) -> Result<cpal::Stream, PlaybackError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(PlaybackError::NoDevice)?;
        let config = device
            .default_output_config()
            .map_err(|e| PlaybackError::Stream(e.to_string()))?;
        let channels = config.channels() as usize;
        let out_rate = config.sample_rate().0 as u64;
        let step = ((self.clip.sample_rate() as u64) << 16) / out_rate.max(1);

        let clip = self.clip.clone();
        let shared = Arc::clone(&self.shared);

        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if !shared.playing.load(Ordering::Acquire) {
                        data.fill(0.0);
                        return;
                    }
                    let Some(samples) = clip.samples() else {
                        shared.playing.store(false, Ordering::Release);
                        data.fill(0.0);
                        return;
                    };

                    let mut position = shared.position.load(Ordering::Acquire);
                    for frame in data.chunks_mut(channels.max(1)) {
                        let index = (position >> 16) as usize;
                        if index >= samples.len() {
                            shared.playing.store(false, Ordering::Release);
                            frame.fill(0.0);
                            continue;
                        }
                        let value = samples[index] as f32 / i16::MAX as f32;
                        frame.fill(value);
                        position += step;
                    }
                    shared.position.store(position, Ordering::Release);
                },
                |err| log::error!("playback stream error: {err}"),
                None,
            )
            .map_err(|e| PlaybackError::Stream(e.to_string()))?;

        Ok(stream)
    }
}
