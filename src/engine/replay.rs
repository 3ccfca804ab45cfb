// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Background replay of a recorded take.
//!
//! Replay runs on its own thread so input handling never blocks on the
//! inter-note delays. The worker owns the thread handle and a cancel flag;
//! cancelling stops every sound the replay started.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::audio::{AudioSink, VoiceId};
use crate::music::BASE_OCTAVE;
use crate::recording::ReplayStep;
use crate::synth;

/// Granularity of cancellation checks while waiting between notes
const WAIT_SLICE: Duration = Duration::from_millis(10);

/// Playback settings captured when a replay starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplayParams {
    /// Length of every replayed note in seconds
    pub note_duration: f64,
    /// Linear volume (0.0 - 1.0)
    pub volume: f32,
}

/// Owner of the replay thread
#[derive(Debug, Default)]
pub struct ReplayWorker {
    handle: Option<JoinHandle<usize>>,
    cancel: Arc<AtomicBool>,
}

impl ReplayWorker {
    /// Create an idle worker
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a replay is in progress
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Start replaying. Returns false if a replay is already running.
    pub fn start(&mut self, steps: Vec<ReplayStep>, params: ReplayParams, sink: Arc<dyn AudioSink>) -> bool {
        if self.is_running() {
            return false;
        }
        self.reap();

        let cancel = Arc::new(AtomicBool::new(false));
        self.cancel = Arc::clone(&cancel);
        self.handle = Some(thread::spawn(move || run(steps, params, sink, cancel)));
        true
    }

    /// Cancel a running replay and wait for the thread to exit
    pub fn cancel(&mut self) {
        self.cancel.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("replay thread panicked");
            }
        }
    }

    /// Wait for the current replay to finish. Returns the number of notes
    /// played, or None if nothing was running.
    pub fn wait(&mut self) -> Option<usize> {
        self.handle.take().and_then(|h| h.join().ok())
    }

    /// Join a finished thread so its handle is released
    pub fn reap(&mut self) {
        if self.handle.as_ref().is_some_and(|h| h.is_finished()) {
            self.wait();
        }
    }
}

impl Drop for ReplayWorker {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Sleep for `delay`, waking early on cancellation. Returns false if cancelled.
fn wait(delay: Duration, cancel: &AtomicBool) -> bool {
    let deadline = Instant::now() + delay;
    loop {
        if cancel.load(Ordering::SeqCst) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep((deadline - now).min(WAIT_SLICE));
    }
}

fn run(steps: Vec<ReplayStep>, params: ReplayParams, sink: Arc<dyn AudioSink>, cancel: Arc<AtomicBool>) -> usize {
    tracing::info!(notes = steps.len(), "replay started");
    let mut started: Vec<VoiceId> = Vec::with_capacity(steps.len());

    for step in &steps {
        if !wait(step.delay, &cancel) {
            break;
        }
        let samples = synth::synthesize(step.note, step.octave - BASE_OCTAVE, params.note_duration);
        match sink.play(Arc::from(samples), false, params.volume) {
            Ok(id) => started.push(id),
            Err(e) => tracing::warn!("replay could not play {}{}: {}", step.note, step.octave, e),
        }
    }

    if cancel.load(Ordering::SeqCst) {
        for id in &started {
            sink.stop(*id);
        }
        tracing::info!(played = started.len(), "replay cancelled");
    } else {
        tracing::info!(played = started.len(), "replay finished");
    }
    started.len()
}
