// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Playback engine.
//!
//! Owns the synthesis parameters and the voices of held keys, and feeds
//! the recording log while recording is active. All mutation funnels
//! through the methods here; the only background activity is replay.

pub mod replay;

pub use replay::{ReplayParams, ReplayWorker};

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::SystemTime;

use thiserror::Error;

use crate::audio::{AudioSink, VoiceId};
use crate::config::PlaybackConfig;
use crate::music::{KeyMap, Note, BASE_OCTAVE};
use crate::recording::{ExportError, ExportOutcome, RecordedEvent, RecordingLog};
use crate::synth;

/// Lowest selectable octave
pub const MIN_OCTAVE: i32 = 2;
/// Highest selectable octave
pub const MAX_OCTAVE: i32 = 6;
/// Volume change per step
pub const VOLUME_STEP: f32 = 0.1;

/// Tunable synthesis parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthesisState {
    /// Current octave (2-6)
    pub octave: i32,
    /// Linear volume (0.0 - 1.0)
    pub volume: f32,
    /// Keep notes sounding after key release
    pub sustain: bool,
}

impl Default for SynthesisState {
    fn default() -> Self {
        Self {
            octave: BASE_OCTAVE,
            volume: 0.5,
            sustain: true,
        }
    }
}

/// A sounding note bound to a physical key. Dropping the voice stops
/// its sound.
pub struct Voice {
    note: Note,
    octave: i32,
    id: VoiceId,
    /// Key was let go while sustain kept the note sounding
    released: bool,
    sink: Arc<dyn AudioSink>,
}

impl Voice {
    /// Note being played
    pub fn note(&self) -> Note {
        self.note
    }

    /// Absolute octave
    pub fn octave(&self) -> i32 {
        self.octave
    }

    /// Check if the sink is still playing the sound
    pub fn is_sounding(&self) -> bool {
        self.sink.is_playing(self.id)
    }
}

impl Drop for Voice {
    fn drop(&mut self) {
        self.sink.stop(self.id);
    }
}

impl std::fmt::Debug for Voice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Voice")
            .field("note", &self.note)
            .field("octave", &self.octave)
            .field("id", &self.id)
            .field("released", &self.released)
            .finish()
    }
}

/// Result of toggling recording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordToggle {
    /// Recording started; previous take discarded
    Started,
    /// Recording stopped; take kept
    Stopped,
    /// A replay is reading the take, recording was not started
    BlockedByReplay,
}

/// Result of a replay request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayOutcome {
    /// Replay running in the background
    Started { notes: usize },
    /// No notes have been recorded
    NothingToReplay,
    /// A replay is already running
    AlreadyRunning,
}

/// Engine errors
#[derive(Debug, Error)]
pub enum EngineError {
    /// Recording log mutex was poisoned by a panicking thread
    #[error("recording log is unavailable")]
    LockPoisoned,
    /// Export failed
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Snapshot of engine state for display
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    /// Sounding notes with their octaves, lowest first
    pub playing: Vec<(Note, i32)>,
    /// Current octave
    pub octave: i32,
    /// Linear volume
    pub volume: f32,
    /// Sustain flag
    pub sustain: bool,
    /// Recording flag
    pub recording: bool,
    /// Replay in progress
    pub replaying: bool,
}

impl Status {
    /// "Playing: C4, E4" or "Playing: None"
    pub fn playing_text(&self) -> String {
        if self.playing.is_empty() {
            return "Playing: None".to_string();
        }
        let notes: Vec<String> = self
            .playing
            .iter()
            .map(|(note, octave)| format!("{}{}", note, octave))
            .collect();
        format!("Playing: {}", notes.join(", "))
    }

    pub fn octave_text(&self) -> String {
        format!("Octave: {}", self.octave)
    }

    pub fn recording_text(&self) -> String {
        format!("Recording: {}", on_off(self.recording))
    }

    pub fn sustain_text(&self) -> String {
        format!("Sustain: {}", on_off(self.sustain))
    }

    /// Volume as a whole percentage
    pub fn volume_percent(&self) -> u32 {
        (self.volume * 100.0).round() as u32
    }

    pub fn volume_text(&self) -> String {
        format!("Volume: {}%", self.volume_percent())
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "ON"
    } else {
        "OFF"
    }
}

/// The piano's playback engine
pub struct PlaybackEngine {
    state: SynthesisState,
    keymap: KeyMap,
    voices: HashMap<char, Voice>,
    recording: Arc<Mutex<RecordingLog>>,
    sink: Arc<dyn AudioSink>,
    replay: ReplayWorker,
    /// Length of the tone synthesized for a held key, in seconds
    hold_duration: f64,
    /// Length of each replayed note, in seconds
    replay_note_duration: f64,
}

impl PlaybackEngine {
    /// Create an engine with default settings
    pub fn new(keymap: KeyMap, sink: Arc<dyn AudioSink>) -> Self {
        Self::with_config(&PlaybackConfig::default(), keymap, sink)
    }

    /// Create an engine from configuration
    pub fn with_config(config: &PlaybackConfig, keymap: KeyMap, sink: Arc<dyn AudioSink>) -> Self {
        let state = SynthesisState {
            octave: config.octave.clamp(MIN_OCTAVE, MAX_OCTAVE),
            volume: config.volume.clamp(0.0, 1.0),
            sustain: config.sustain,
        };
        Self {
            state,
            keymap,
            voices: HashMap::new(),
            recording: Arc::new(Mutex::new(RecordingLog::new())),
            sink,
            replay: ReplayWorker::new(),
            hold_duration: config.hold_duration,
            replay_note_duration: config.replay_note_duration,
        }
    }

    /// Current synthesis parameters
    pub fn state(&self) -> SynthesisState {
        self.state
    }

    /// Key bindings
    pub fn keymap(&self) -> &KeyMap {
        &self.keymap
    }

    /// Shared handle to the recording log
    pub fn recording(&self) -> Arc<Mutex<RecordingLog>> {
        Arc::clone(&self.recording)
    }

    /// Check if a key has a voice
    pub fn is_held(&self, key: char) -> bool {
        self.voices.contains_key(&key.to_ascii_lowercase())
    }

    /// Voice bound to a key, if any
    pub fn voice(&self, key: char) -> Option<&Voice> {
        self.voices.get(&key.to_ascii_lowercase())
    }

    /// Number of voices
    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    /// Keys with a voice, sorted
    pub fn held_keys(&self) -> Vec<char> {
        let mut keys: Vec<char> = self.voices.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Strike a key. Returns true if a new voice was started.
    ///
    /// A key that already has a voice is ignored, unless sustain kept it
    /// ringing after release, in which case the old voice is replaced.
    pub fn key_down(&mut self, key: char) -> bool {
        let key = key.to_ascii_lowercase();
        let Some(note) = self.keymap.note_for(key) else {
            return false;
        };
        if let Some(voice) = self.voices.get(&key) {
            if !voice.released {
                return false;
            }
        }
        // drop stops a re-struck sustained voice
        self.voices.remove(&key);

        let octave = self.state.octave;
        let samples: Arc<[i16]> =
            Arc::from(synth::synthesize(note, octave - BASE_OCTAVE, self.hold_duration));

        match self.sink.play(Arc::clone(&samples), self.state.sustain, self.state.volume) {
            Ok(id) => {
                tracing::debug!(key = %key, "note on {}{}", note, octave);
                if let Ok(mut log) = self.recording.lock() {
                    if log.record(RecordedEvent::new(note, octave, SystemTime::now()), samples) {
                        tracing::debug!("recorded {}{}", note, octave);
                    }
                }
                self.voices.insert(
                    key,
                    Voice {
                        note,
                        octave,
                        id,
                        released: false,
                        sink: Arc::clone(&self.sink),
                    },
                );
                true
            }
            Err(e) => {
                tracing::warn!("could not play {}{}: {}", note, octave, e);
                false
            }
        }
    }

    /// Release a key. Without sustain the voice stops immediately; with
    /// sustain it keeps sounding. Returns true if a voice was stopped.
    pub fn key_up(&mut self, key: char) -> bool {
        let key = key.to_ascii_lowercase();
        if self.state.sustain {
            if let Some(voice) = self.voices.get_mut(&key) {
                voice.released = true;
            }
            return false;
        }
        match self.voices.remove(&key) {
            Some(voice) => {
                tracing::debug!(key = %key, "note off {}{}", voice.note, voice.octave);
                true
            }
            None => false,
        }
    }

    /// Shift the octave, clamped to the selectable range
    pub fn set_octave(&mut self, delta: i32) -> i32 {
        self.state.octave = self
            .state
            .octave
            .saturating_add(delta)
            .clamp(MIN_OCTAVE, MAX_OCTAVE);
        tracing::info!(octave = self.state.octave, "octave changed");
        self.state.octave
    }

    /// Change the volume, kept on tenths and clamped to 0.0 - 1.0
    pub fn set_volume(&mut self, delta: f32) -> f32 {
        let stepped = ((self.state.volume + delta) * 10.0).round() / 10.0;
        self.state.volume = stepped.clamp(0.0, 1.0);
        tracing::info!(volume = self.state.volume, "volume changed");
        self.state.volume
    }

    /// Flip sustain mode
    pub fn toggle_sustain(&mut self) -> bool {
        self.state.sustain = !self.state.sustain;
        tracing::info!(sustain = self.state.sustain, "sustain toggled");
        self.state.sustain
    }

    /// Start or stop recording. Starting discards the previous take and is
    /// refused while a replay is running.
    pub fn toggle_recording(&mut self) -> Result<RecordToggle, EngineError> {
        let replaying = self.replay.is_running();
        let mut log = self.log()?;
        if log.is_recording() {
            log.stop();
            tracing::info!(notes = log.events().len(), "recording stopped");
            return Ok(RecordToggle::Stopped);
        }
        if replaying {
            tracing::info!("recording refused while replay is running");
            return Ok(RecordToggle::BlockedByReplay);
        }
        log.start();
        tracing::info!("recording started");
        Ok(RecordToggle::Started)
    }

    /// Check if recording is active
    pub fn is_recording(&self) -> bool {
        self.recording.lock().map(|log| log.is_recording()).unwrap_or(false)
    }

    /// Replay the recorded take in the background
    pub fn replay(&mut self) -> Result<ReplayOutcome, EngineError> {
        if self.replay.is_running() {
            return Ok(ReplayOutcome::AlreadyRunning);
        }
        let steps = {
            let log = self.log()?;
            if log.is_empty() {
                tracing::info!("nothing to replay");
                return Ok(ReplayOutcome::NothingToReplay);
            }
            log.replay_schedule()
        };

        let notes = steps.len();
        let params = ReplayParams {
            note_duration: self.replay_note_duration,
            volume: self.state.volume,
        };
        if !self.replay.start(steps, params, Arc::clone(&self.sink)) {
            return Ok(ReplayOutcome::AlreadyRunning);
        }
        Ok(ReplayOutcome::Started { notes })
    }

    /// Check if a replay is running
    pub fn is_replaying(&self) -> bool {
        self.replay.is_running()
    }

    /// Block until the current replay finishes; returns notes played
    pub fn wait_for_replay(&mut self) -> Option<usize> {
        self.replay.wait()
    }

    /// Export the recorded audio to a WAV file
    pub fn export<P: AsRef<Path>>(&self, path: P) -> Result<ExportOutcome, EngineError> {
        let log = self.log()?;
        let outcome = log.export(path)?;
        if outcome == ExportOutcome::NothingToExport {
            tracing::info!("nothing to export");
        }
        Ok(outcome)
    }

    /// Stop every voice and cancel any replay
    pub fn silence(&mut self) {
        let stopped = self.voices.len();
        self.voices.clear();
        self.replay.cancel();
        tracing::info!(stopped, "silenced");
    }

    /// Drop voices whose sound has run out and join a finished replay
    pub fn reap_finished(&mut self) -> usize {
        let before = self.voices.len();
        self.voices.retain(|_, voice| voice.is_sounding());
        self.replay.reap();
        before - self.voices.len()
    }

    /// Snapshot for the status display
    pub fn status(&self) -> Status {
        let mut playing: Vec<(Note, i32)> = self
            .voices
            .values()
            .map(|voice| (voice.note, voice.octave))
            .collect();
        playing.sort_by_key(|&(note, octave)| (octave, note));
        Status {
            playing,
            octave: self.state.octave,
            volume: self.state.volume,
            sustain: self.state.sustain,
            recording: self.is_recording(),
            replaying: self.is_replaying(),
        }
    }

    /// Cancel replay and release all voices
    pub fn shutdown(&mut self) {
        self.silence();
    }

    fn log(&self) -> Result<MutexGuard<'_, RecordingLog>, EngineError> {
        self.recording.lock().map_err(|_| EngineError::LockPoisoned)
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        self.replay.cancel();
    }
}
