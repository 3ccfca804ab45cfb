// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Software mixer summing active voices into the output buffer.

use std::sync::{Arc, Mutex};

use super::{AudioError, AudioSink, VoiceId};

/// A buffer being played back
#[derive(Debug, Clone)]
struct MixerVoice {
    id: VoiceId,
    samples: Arc<[i16]>,
    position: usize,
    looped: bool,
    gain: f32,
}

impl MixerVoice {
    fn finished(&self) -> bool {
        !self.looped && self.position >= self.samples.len()
    }

    /// Next sample in [-1.0, 1.0) scaled by gain
    fn next(&mut self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        if self.position >= self.samples.len() {
            if !self.looped {
                return 0.0;
            }
            self.position = 0;
        }
        let sample = self.samples[self.position] as f32 / 32768.0;
        self.position += 1;
        sample * self.gain
    }
}

/// Sums playing buffers; rendered by the audio output callback
#[derive(Debug, Default)]
pub struct Mixer {
    voices: Vec<MixerVoice>,
    next_id: u64,
}

impl Mixer {
    /// Create an empty mixer
    pub fn new() -> Self {
        Self::default()
    }

    /// Start playing a buffer and return its handle
    pub fn start(&mut self, samples: Arc<[i16]>, looped: bool, gain: f32) -> VoiceId {
        self.next_id += 1;
        let id = VoiceId(self.next_id);
        self.voices.push(MixerVoice {
            id,
            samples,
            position: 0,
            looped,
            gain: gain.clamp(0.0, 1.0),
        });
        id
    }

    /// Stop a voice; returns false if it was not playing
    pub fn stop(&mut self, id: VoiceId) -> bool {
        let before = self.voices.len();
        self.voices.retain(|v| v.id != id);
        self.voices.len() != before
    }

    /// Stop every voice
    pub fn stop_all(&mut self) {
        self.voices.clear();
    }

    /// Check if a voice is still sounding
    pub fn is_active(&self, id: VoiceId) -> bool {
        self.voices.iter().any(|v| v.id == id && !v.finished())
    }

    /// Number of voices currently held by the mixer
    pub fn active_count(&self) -> usize {
        self.voices.len()
    }

    /// Mix all voices into an interleaved buffer, duplicating the mono
    /// signal into every channel. Finished one-shot voices are dropped.
    pub fn render(&mut self, buffer: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        for frame in buffer.chunks_mut(channels) {
            let mut sum = 0.0f32;
            for voice in self.voices.iter_mut() {
                sum += voice.next();
            }
            let sum = sum.clamp(-1.0, 1.0);
            for sample in frame.iter_mut() {
                *sample = sum;
            }
        }
        self.voices.retain(|v| !v.finished());
    }
}

/// Thread-safe handle to a mixer, shared between the engine, the
/// replay worker and the audio callback
#[derive(Debug, Clone, Default)]
pub struct SharedMixer {
    inner: Arc<Mutex<Mixer>>,
}

impl SharedMixer {
    /// Create a handle around a fresh mixer
    pub fn new() -> Self {
        Self::default()
    }

    /// Render into an output buffer (called from the audio callback)
    pub fn render(&self, buffer: &mut [f32], channels: usize) {
        if let Ok(mut mixer) = self.inner.lock() {
            mixer.render(buffer, channels);
        }
    }

    /// Number of voices currently held by the mixer
    pub fn active_count(&self) -> usize {
        self.inner.lock().map(|m| m.active_count()).unwrap_or(0)
    }

    /// Stop every voice
    pub fn stop_all(&self) {
        if let Ok(mut mixer) = self.inner.lock() {
            mixer.stop_all();
        }
    }
}

impl AudioSink for SharedMixer {
    fn play(&self, samples: Arc<[i16]>, looped: bool, volume: f32) -> Result<VoiceId, AudioError> {
        let mut mixer = self.inner.lock().map_err(|_| AudioError::LockFailed)?;
        Ok(mixer.start(samples, looped, volume))
    }

    fn stop(&self, voice: VoiceId) {
        if let Ok(mut mixer) = self.inner.lock() {
            mixer.stop(voice);
        }
    }

    fn is_playing(&self, voice: VoiceId) -> bool {
        self.inner.lock().map(|m| m.is_active(voice)).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(samples: &[i16]) -> Arc<[i16]> {
        Arc::from(samples.to_vec())
    }

    #[test]
    fn test_one_shot_voice_finishes() {
        let mut mixer = Mixer::new();
        let id = mixer.start(buffer(&[16384, 16384]), false, 1.0);
        assert!(mixer.is_active(id));

        let mut out = [0.0f32; 4];
        mixer.render(&mut out, 1);
        assert_eq!(out, [0.5, 0.5, 0.0, 0.0]);
        assert!(!mixer.is_active(id));
        assert_eq!(mixer.active_count(), 0);
    }

    #[test]
    fn test_looped_voice_wraps() {
        let mut mixer = Mixer::new();
        let id = mixer.start(buffer(&[16384, 0]), true, 1.0);

        let mut out = [0.0f32; 5];
        mixer.render(&mut out, 1);
        assert_eq!(out, [0.5, 0.0, 0.5, 0.0, 0.5]);
        assert!(mixer.is_active(id));
    }

    #[test]
    fn test_gain_and_stereo_duplication() {
        let mut mixer = Mixer::new();
        mixer.start(buffer(&[16384]), false, 0.5);

        let mut out = [0.0f32; 2];
        mixer.render(&mut out, 2);
        assert_eq!(out, [0.25, 0.25]);
    }

    #[test]
    fn test_voices_sum_and_clip() {
        let mut mixer = Mixer::new();
        mixer.start(buffer(&[16384]), false, 1.0);
        mixer.start(buffer(&[8192]), false, 1.0);
        mixer.start(buffer(&[32767, 32767]), false, 1.0);
        mixer.start(buffer(&[32767, 32767]), false, 1.0);

        let mut out = [0.0f32; 2];
        mixer.render(&mut out, 1);
        assert_eq!(out[0], 1.0);
        assert_eq!(out[1], 1.0);
    }

    #[test]
    fn test_stop() {
        let mut mixer = Mixer::new();
        let a = mixer.start(buffer(&[1, 2, 3]), true, 1.0);
        let b = mixer.start(buffer(&[1, 2, 3]), true, 1.0);
        assert_ne!(a, b);

        assert!(mixer.stop(a));
        assert!(!mixer.stop(a));
        assert!(!mixer.is_active(a));
        assert!(mixer.is_active(b));

        mixer.stop_all();
        assert_eq!(mixer.active_count(), 0);
    }

    #[test]
    fn test_shared_mixer_sink() {
        let mixer = SharedMixer::new();
        let id = mixer.play(buffer(&[100; 10]), false, 0.5).unwrap();
        assert!(mixer.is_playing(id));
        assert_eq!(mixer.active_count(), 1);

        mixer.stop(id);
        assert!(!mixer.is_playing(id));
    }
}
