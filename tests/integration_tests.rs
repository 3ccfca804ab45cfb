// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Integration tests for the piano
//!
//! These tests drive the public API the way the terminal front-end does,
//! with the software mixer standing in for the audio device.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use piano::audio::{AudioSink, SharedMixer};
use piano::config::{PianoConfig, PlaybackConfig};
use piano::control::{ControlAction, Feedback, InputDispatcher, InputEvent, KeyboardController};
use piano::engine::{PlaybackEngine, RecordToggle, ReplayOutcome};
use piano::music::{KeyMap, Note};
use piano::recording::ExportOutcome;
use piano::synth::{synthesize, PEAK};
use tempfile::tempdir;

fn playback() -> PlaybackConfig {
    PlaybackConfig {
        hold_duration: 0.2,
        replay_note_duration: 0.05,
        ..PlaybackConfig::default()
    }
}

fn engine_with_mixer() -> (PlaybackEngine, SharedMixer) {
    let mixer = SharedMixer::new();
    let sink: Arc<dyn AudioSink> = Arc::new(mixer.clone());
    let engine = PlaybackEngine::with_config(&playback(), KeyMap::default(), sink);
    (engine, mixer)
}

fn press(c: char) -> KeyEvent {
    KeyEvent {
        code: KeyCode::Char(c),
        modifiers: KeyModifiers::NONE,
        kind: KeyEventKind::Press,
        state: KeyEventState::NONE,
    }
}

/// Record C4 and E4, then export; the file holds both segments back to back
#[test]
fn test_recording_round_trip_export() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("take.wav");
    let (mut engine, _mixer) = engine_with_mixer();

    assert_eq!(engine.toggle_recording().unwrap(), RecordToggle::Started);
    assert!(engine.key_down('a'));
    assert!(engine.key_down('d'));
    assert_eq!(engine.toggle_recording().unwrap(), RecordToggle::Stopped);

    let (events, total) = {
        let log = engine.recording();
        let log = log.lock().unwrap();
        let events: Vec<(Note, i32)> = log.events().iter().map(|e| (e.note, e.octave)).collect();
        (events, log.total_samples())
    };
    assert_eq!(events, vec![(Note::C, 4), (Note::E, 4)]);

    let summary = match engine.export(&path).unwrap() {
        ExportOutcome::Saved(summary) => summary,
        ExportOutcome::NothingToExport => panic!("expected a saved file"),
    };
    assert_eq!(summary.samples, total);
    assert_eq!(summary.segments, 2);
    assert!(summary.path.is_absolute());

    let mut reader = hound::WavReader::open(&path).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 44100);
    assert_eq!(spec.bits_per_sample, 16);

    let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(samples.len(), total);

    let first = synthesize(Note::C, 0, 0.2);
    assert_eq!(&samples[..first.len()], &first[..]);
}

/// Exporting again replaces the previous file
#[test]
fn test_export_overwrites() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("take.wav");
    let (mut engine, _mixer) = engine_with_mixer();

    engine.toggle_recording().unwrap();
    engine.key_down('a');
    engine.key_down('s');
    engine.toggle_recording().unwrap();
    engine.export(&path).unwrap();

    engine.toggle_recording().unwrap();
    engine.key_down('k');
    engine.toggle_recording().unwrap();
    engine.export(&path).unwrap();

    let reader = hound::WavReader::open(&path).unwrap();
    assert_eq!(reader.len() as usize, synthesize(Note::CHigh, 0, 0.2).len());
}

/// Nothing recorded: replay and export are informational no-ops
#[test]
fn test_empty_take() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("take.wav");
    let (mut engine, mixer) = engine_with_mixer();

    assert_eq!(engine.replay().unwrap(), ReplayOutcome::NothingToReplay);
    assert_eq!(mixer.active_count(), 0);
    assert_eq!(engine.export(&path).unwrap(), ExportOutcome::NothingToExport);
    assert!(!path.exists());
}

/// Held notes reach the mixer and key releases reach it too
#[test]
fn test_voices_reach_mixer() {
    let (mut engine, mixer) = engine_with_mixer();
    engine.toggle_sustain();

    engine.key_down('a');
    engine.key_down('g');
    assert_eq!(mixer.active_count(), 2);

    let mut buffer = vec![0.0f32; 64];
    mixer.render(&mut buffer, 2);
    assert!(buffer.iter().any(|&s| s != 0.0));

    engine.key_up('a');
    assert_eq!(mixer.active_count(), 1);
    engine.key_up('g');
    assert_eq!(mixer.active_count(), 0);
}

/// With sustain the voice outlives the key and is stopped by silence
#[test]
fn test_sustain_until_silenced() {
    let (mut engine, mixer) = engine_with_mixer();
    assert!(engine.state().sustain);

    engine.key_down('h');
    engine.key_up('h');
    assert_eq!(mixer.active_count(), 1);
    assert_eq!(engine.status().playing_text(), "Playing: A4");

    engine.silence();
    assert_eq!(mixer.active_count(), 0);
    assert_eq!(engine.status().playing_text(), "Playing: None");
}

/// Replay plays every recorded note once through the mixer
#[test]
fn test_replay_through_mixer() {
    let (mut engine, mixer) = engine_with_mixer();

    engine.toggle_recording().unwrap();
    engine.key_down('a');
    thread::sleep(Duration::from_millis(20));
    engine.key_down('s');
    engine.toggle_recording().unwrap();
    engine.silence();

    assert_eq!(engine.replay().unwrap(), ReplayOutcome::Started { notes: 2 });
    assert_eq!(engine.wait_for_replay(), Some(2));
    assert!(!engine.is_replaying());

    // the replay wrote nothing new into the take
    assert_eq!(engine.recording().lock().unwrap().events().len(), 2);

    // one-shot replay voices drain out of the mixer
    let mut buffer = vec![0.0f32; 44100 * 2];
    mixer.render(&mut buffer, 2);
    assert_eq!(mixer.active_count(), 0);
}

/// Keyboard events flow through the dispatcher into the engine
#[test]
fn test_dispatcher_session() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("session.wav");
    let (mut engine, _mixer) = engine_with_mixer();
    let dispatcher = InputDispatcher::new(KeyboardController::with_defaults(), &path);

    let run = |engine: &mut PlaybackEngine, c: char| {
        let event = dispatcher
            .translate_key(&press(c), &KeyMap::default())
            .expect("bound key");
        dispatcher.dispatch(engine, event)
    };

    assert_eq!(run(&mut engine, 'x'), Feedback::Message("Octave: 5".to_string()));
    assert_eq!(run(&mut engine, 'r'), Feedback::Message("Recording...".to_string()));
    assert_eq!(run(&mut engine, 'a'), Feedback::None);
    assert_eq!(run(&mut engine, 'w'), Feedback::None);
    assert_eq!(
        run(&mut engine, 'r'),
        Feedback::Message("Recording stopped (2 notes)".to_string())
    );

    let notes: Vec<(Note, i32)> = engine
        .recording()
        .lock()
        .unwrap()
        .events()
        .iter()
        .map(|e| (e.note, e.octave))
        .collect();
    assert_eq!(notes, vec![(Note::C, 5), (Note::Cs, 5)]);

    match run(&mut engine, 'v') {
        Feedback::Message(msg) => assert!(msg.starts_with("Saved to "), "{}", msg),
        other => panic!("unexpected feedback {:?}", other),
    }
    assert!(path.exists());

    let quit = dispatcher.dispatch(&mut engine, InputEvent::Command(ControlAction::Quit));
    assert_eq!(quit, Feedback::Quit);
}

/// Every synthesized note peaks at full scale
#[test]
fn test_all_notes_full_scale() {
    for note in Note::ALL {
        for shift in -2..=2 {
            let samples = synthesize(note, shift, 0.05);
            let peak = samples.iter().map(|s| s.unsigned_abs()).max().unwrap();
            assert_eq!(peak, PEAK as u16, "{}{}", note, 4 + shift);
        }
    }
}

/// A configuration file drives the engine's defaults
#[test]
fn test_config_drives_engine() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("piano.yaml");
    std::fs::write(
        &path,
        "playback:\n  octave: 9\n  volume: 0.3\n  sustain: false\nkeys:\n  white: [\"q\", \"s\", \"d\", \"f\", \"g\", \"h\", \"j\", \"k\"]\n",
    )
    .unwrap();

    let config = PianoConfig::load(&path).unwrap();
    let keymap = config.keys.keymap().unwrap();
    let engine = PlaybackEngine::with_config(&config.playback, keymap, Arc::new(SharedMixer::new()));

    let state = engine.state();
    assert_eq!(state.octave, 6);
    assert_eq!(state.volume, 0.3);
    assert!(!state.sustain);
    assert_eq!(engine.keymap().note_for('q'), Some(Note::C));
    assert_eq!(engine.keymap().note_for('a'), None);
}
