// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Audio engine for the piano.
//!
//! This module provides:
//! - The `AudioSink` abstraction the playback engine talks to
//! - A software mixer holding every sounding voice
//! - Audio output via cpal
//! - A silent sink that keeps note timing when there is no device

pub mod mixer;
pub mod output;
pub mod silent;

pub use mixer::{Mixer, SharedMixer};
pub use output::{list_devices, default_device_name, AudioConfig, AudioOutput};
pub use silent::SilentSink;

use std::sync::Arc;

use thiserror::Error;

/// Handle to a sound started on a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoiceId(pub u64);

/// Trait for audio sinks.
///
/// Buffers are mono 16-bit PCM at the synthesis sample rate. Starting a
/// sound is fire-and-forget; the returned handle is the only way to stop
/// it early.
pub trait AudioSink: Send + Sync {
    /// Start playing a buffer, optionally looped forever, at a linear
    /// volume in 0.0..=1.0
    fn play(&self, samples: Arc<[i16]>, looped: bool, volume: f32) -> Result<VoiceId, AudioError>;

    /// Stop a playing sound; unknown or finished handles are ignored
    fn stop(&self, voice: VoiceId);

    /// Check whether a sound is still playing
    fn is_playing(&self, voice: VoiceId) -> bool;
}

/// Audio engine combining the mixer and the device output
pub struct AudioEngine {
    /// Mixer shared with the output callback
    mixer: SharedMixer,
    /// Stand-in used while no output is running
    silent: SilentSink,
    /// Audio output
    output: Option<AudioOutput>,
    /// Output configuration
    config: AudioConfig,
}

impl AudioEngine {
    /// Create a new audio engine
    pub fn new(config: AudioConfig) -> Self {
        Self {
            mixer: SharedMixer::new(),
            silent: SilentSink::new(),
            output: None,
            config,
        }
    }

    /// Sink handle for starting and stopping sounds. Without a running
    /// output nothing renders the mixer, so the silent sink is handed out
    /// instead and one-shot sounds still end on time.
    pub fn sink(&self) -> Arc<dyn AudioSink> {
        if self.output.is_some() {
            Arc::new(self.mixer.clone())
        } else {
            Arc::new(self.silent.clone())
        }
    }

    /// Start audio output
    pub fn start(&mut self) -> Result<(), AudioError> {
        if self.output.is_some() {
            return Ok(());
        }
        if self.config.channels == 0 {
            return Err(AudioError::InvalidConfig("channels must be at least 1".into()));
        }

        let mixer = self.mixer.clone();
        let output = AudioOutput::new(self.config.clone(), move |buffer, channels| {
            mixer.render(buffer, channels);
        })?;

        tracing::info!(
            device = output.device_name(),
            sample_rate = self.config.sample_rate,
            latency_ms = ?output.latency_ms(),
            "audio output started"
        );
        self.output = Some(output);
        Ok(())
    }

    /// Stop audio output and silence every voice
    pub fn stop(&mut self) {
        self.mixer.stop_all();
        self.output = None;
    }

    /// Check if running
    pub fn is_running(&self) -> bool {
        self.output.is_some()
    }

    /// Get sample rate
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }
}

impl Default for AudioEngine {
    fn default() -> Self {
        Self::new(AudioConfig::default())
    }
}

/// Audio error types
#[derive(Debug, Clone, Error)]
pub enum AudioError {
    /// Failed to start audio stream
    #[error("Audio stream failed: {0}")]
    StreamFailed(String),
    /// Failed to acquire lock
    #[error("Failed to acquire audio lock")]
    LockFailed,
    /// No audio device available
    #[error("No audio device available")]
    NoDevice,
    /// Named device not found
    #[error("Audio device not found: {0}")]
    UnknownDevice(String),
    /// Invalid configuration
    #[error("Invalid audio configuration: {0}")]
    InvalidConfig(String),
}
