// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Note capture while recording.
//!
//! Keeps two parallel logs: the symbolic note events (for replay) and the
//! raw audio each note produced when it was struck (for export).

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use super::export::{ExportError, ExportSummary, WavExporter};
use crate::music::Note;

/// Recording state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordingState {
    /// Not recording
    #[default]
    Idle,
    /// Actively recording
    Recording,
}

/// A note struck while recording
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    /// Note played
    pub note: Note,
    /// Absolute octave at the time it was played
    pub octave: i32,
    /// Wall-clock time the key went down
    pub timestamp: SystemTime,
}

impl RecordedEvent {
    /// Create a new recorded event
    pub fn new(note: Note, octave: i32, timestamp: SystemTime) -> Self {
        Self {
            note,
            octave,
            timestamp,
        }
    }
}

/// One step of a replay: wait `delay`, then play the note
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplayStep {
    /// Time to wait after the previous step
    pub delay: Duration,
    /// Note to play
    pub note: Note,
    /// Absolute octave
    pub octave: i32,
}

/// Result of an export request
#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    /// File written
    Saved(ExportSummary),
    /// Nothing has been captured
    NothingToExport,
}

/// Ordered log of recorded notes and their audio
#[derive(Debug, Default)]
pub struct RecordingLog {
    state: RecordingState,
    events: Vec<RecordedEvent>,
    segments: Vec<Arc<[i16]>>,
}

impl RecordingLog {
    /// Create an idle, empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current state
    pub fn state(&self) -> RecordingState {
        self.state
    }

    /// Check if recording is active
    pub fn is_recording(&self) -> bool {
        self.state == RecordingState::Recording
    }

    /// Start recording, discarding the previous take
    pub fn start(&mut self) {
        self.clear();
        self.state = RecordingState::Recording;
    }

    /// Stop recording; the take is kept for replay and export
    pub fn stop(&mut self) {
        self.state = RecordingState::Idle;
    }

    /// Clear recorded events and audio
    pub fn clear(&mut self) {
        self.events.clear();
        self.segments.clear();
    }

    /// Append a note and its audio. Returns false (and records nothing)
    /// when not recording.
    pub fn record(&mut self, event: RecordedEvent, audio: Arc<[i16]>) -> bool {
        if !self.is_recording() {
            return false;
        }
        self.events.push(event);
        self.segments.push(audio);
        true
    }

    /// Recorded events in capture order
    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Captured audio segments in capture order
    pub fn segments(&self) -> &[Arc<[i16]>] {
        &self.segments
    }

    /// Total captured samples across all segments
    pub fn total_samples(&self) -> usize {
        self.segments.iter().map(|s| s.len()).sum()
    }

    /// Check if no notes have been captured
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Build the replay schedule. Each delay is the gap to the previous
    /// event; a clock that stepped backwards yields a zero delay.
    pub fn replay_schedule(&self) -> Vec<ReplayStep> {
        let mut previous: Option<SystemTime> = None;
        self.events
            .iter()
            .map(|event| {
                let delay = previous
                    .and_then(|prev| event.timestamp.duration_since(prev).ok())
                    .unwrap_or(Duration::ZERO);
                previous = Some(event.timestamp);
                ReplayStep {
                    delay,
                    note: event.note,
                    octave: event.octave,
                }
            })
            .collect()
    }

    /// Write the captured audio to a WAV file, overwriting it
    pub fn export<P: AsRef<Path>>(&self, path: P) -> Result<ExportOutcome, ExportError> {
        if self.segments.is_empty() {
            return Ok(ExportOutcome::NothingToExport);
        }
        let summary = WavExporter::new().export(&self.segments, path)?;
        Ok(ExportOutcome::Saved(summary))
    }
}
