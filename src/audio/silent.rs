// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Sink used when no output device could be opened.
//!
//! Nothing is heard, but sounds keep their timing: a one-shot buffer
//! counts as playing until its length has elapsed on the wall clock, and
//! a looped one until it is stopped.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use super::{AudioError, AudioSink, VoiceId};
use crate::synth::duration_of;

#[derive(Debug, Default)]
struct Timeline {
    /// End time of each sound; None for looped sounds
    voices: HashMap<VoiceId, Option<Instant>>,
    next_id: u64,
}

impl Timeline {
    fn prune(&mut self, now: Instant) {
        self.voices.retain(|_, end| end.map_or(true, |end| now < end));
    }
}

/// Sink that plays nothing and expires one-shot sounds by elapsed time
#[derive(Debug, Clone, Default)]
pub struct SilentSink {
    inner: Arc<Mutex<Timeline>>,
}

impl SilentSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sounds that have not yet run out
    pub fn active_count(&self) -> usize {
        match self.inner.lock() {
            Ok(mut timeline) => {
                timeline.prune(Instant::now());
                timeline.voices.len()
            }
            Err(_) => 0,
        }
    }
}

impl AudioSink for SilentSink {
    fn play(&self, samples: Arc<[i16]>, looped: bool, _volume: f32) -> Result<VoiceId, AudioError> {
        let mut timeline = self.inner.lock().map_err(|_| AudioError::LockFailed)?;
        let now = Instant::now();
        timeline.prune(now);

        timeline.next_id += 1;
        let id = VoiceId(timeline.next_id);
        let end = if looped {
            None
        } else {
            Some(now + Duration::from_secs_f64(duration_of(samples.len())))
        };
        timeline.voices.insert(id, end);
        Ok(id)
    }

    fn stop(&self, voice: VoiceId) {
        if let Ok(mut timeline) = self.inner.lock() {
            timeline.voices.remove(&voice);
        }
    }

    fn is_playing(&self, voice: VoiceId) -> bool {
        match self.inner.lock() {
            Ok(timeline) => match timeline.voices.get(&voice) {
                Some(Some(end)) => Instant::now() < *end,
                Some(None) => true,
                None => false,
            },
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn tone(samples: usize) -> Arc<[i16]> {
        Arc::from(vec![0i16; samples])
    }

    #[test]
    fn test_one_shot_expires() {
        let sink = SilentSink::new();
        // 441 samples is 10 ms
        let id = sink.play(tone(441), false, 1.0).unwrap();
        assert!(sink.is_playing(id));

        thread::sleep(Duration::from_millis(50));
        assert!(!sink.is_playing(id));
        assert_eq!(sink.active_count(), 0);
    }

    #[test]
    fn test_looped_plays_until_stopped() {
        let sink = SilentSink::new();
        let id = sink.play(tone(1), true, 1.0).unwrap();

        thread::sleep(Duration::from_millis(10));
        assert!(sink.is_playing(id));

        sink.stop(id);
        assert!(!sink.is_playing(id));
        assert_eq!(sink.active_count(), 0);
    }

    #[test]
    fn test_empty_buffer_never_plays() {
        let sink = SilentSink::new();
        let id = sink.play(tone(0), false, 1.0).unwrap();
        assert!(!sink.is_playing(id));
    }
}
