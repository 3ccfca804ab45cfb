// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Input dispatch.
//!
//! Turns raw terminal events into [`InputEvent`]s and applies them to the
//! playback engine, producing user-facing feedback.

use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use super::{ControlAction, Feedback, InputEvent, KeyboardController};
use crate::engine::{PlaybackEngine, RecordToggle, ReplayOutcome, VOLUME_STEP};
use crate::music::KeyMap;
use crate::recording::ExportOutcome;

/// Normalizes keyboard and mouse input and drives the engine
#[derive(Debug, Clone)]
pub struct InputDispatcher {
    keyboard: KeyboardController,
    /// Piano key currently pressed with the mouse
    mouse_key: Option<char>,
    /// WAV file written on export
    export_path: PathBuf,
}

impl InputDispatcher {
    /// Create a dispatcher
    pub fn new(keyboard: KeyboardController, export_path: impl Into<PathBuf>) -> Self {
        Self {
            keyboard,
            mouse_key: None,
            export_path: export_path.into(),
        }
    }

    /// Control key bindings
    pub fn keyboard(&self) -> &KeyboardController {
        &self.keyboard
    }

    /// Export destination
    pub fn export_path(&self) -> &Path {
        &self.export_path
    }

    /// Translate a key event. Control shortcuts win over piano keys;
    /// auto-repeat is ignored.
    pub fn translate_key(&self, event: &KeyEvent, keymap: &KeyMap) -> Option<InputEvent> {
        match event.kind {
            KeyEventKind::Press => {
                if let Some(action) = self.keyboard.get_action(event.code, event.modifiers) {
                    return Some(InputEvent::Command(action.clone()));
                }
                piano_key(event, keymap).map(InputEvent::KeyDown)
            }
            KeyEventKind::Release => piano_key(event, keymap).map(InputEvent::KeyUp),
            KeyEventKind::Repeat => None,
        }
    }

    /// Translate a mouse event. `hit` maps a terminal cell to the piano
    /// key drawn there.
    pub fn translate_mouse<F>(&mut self, event: &MouseEvent, hit: F) -> Option<InputEvent>
    where
        F: Fn(u16, u16) -> Option<char>,
    {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let key = hit(event.column, event.row)?;
                self.mouse_key = Some(key);
                Some(InputEvent::KeyDown(key))
            }
            MouseEventKind::Up(MouseButton::Left) => self.mouse_key.take().map(InputEvent::KeyUp),
            _ => None,
        }
    }

    /// Apply an event to the engine
    pub fn dispatch(&self, engine: &mut PlaybackEngine, event: InputEvent) -> Feedback {
        match event {
            InputEvent::KeyDown(key) => {
                engine.key_down(key);
                Feedback::None
            }
            InputEvent::KeyUp(key) => {
                engine.key_up(key);
                Feedback::None
            }
            InputEvent::Command(action) => self.command(engine, action),
        }
    }

    fn command(&self, engine: &mut PlaybackEngine, action: ControlAction) -> Feedback {
        match action {
            ControlAction::OctaveDown => {
                engine.set_octave(-1);
                Feedback::Message(engine.status().octave_text())
            }
            ControlAction::OctaveUp => {
                engine.set_octave(1);
                Feedback::Message(engine.status().octave_text())
            }
            ControlAction::VolumeUp => {
                engine.set_volume(VOLUME_STEP);
                Feedback::Message(engine.status().volume_text())
            }
            ControlAction::VolumeDown => {
                engine.set_volume(-VOLUME_STEP);
                Feedback::Message(engine.status().volume_text())
            }
            ControlAction::ToggleSustain => {
                engine.toggle_sustain();
                Feedback::Message(engine.status().sustain_text())
            }
            ControlAction::ToggleRecord => match engine.toggle_recording() {
                Ok(RecordToggle::Started) => Feedback::Message("Recording...".to_string()),
                Ok(RecordToggle::Stopped) => {
                    let notes = engine
                        .recording()
                        .lock()
                        .map(|log| log.events().len())
                        .unwrap_or(0);
                    Feedback::Message(format!("Recording stopped ({} notes)", notes))
                }
                Ok(RecordToggle::BlockedByReplay) => {
                    Feedback::Message("Playback in progress; recording not started".to_string())
                }
                Err(e) => Feedback::Message(format!("Recording failed: {}", e)),
            },
            ControlAction::Replay => match engine.replay() {
                Ok(ReplayOutcome::Started { notes }) => {
                    Feedback::Message(format!("Playing back {} notes", notes))
                }
                Ok(ReplayOutcome::NothingToReplay) => {
                    Feedback::Message("No notes recorded.".to_string())
                }
                Ok(ReplayOutcome::AlreadyRunning) => {
                    Feedback::Message("Playback already running".to_string())
                }
                Err(e) => Feedback::Message(format!("Playback failed: {}", e)),
            },
            ControlAction::Export => match engine.export(&self.export_path) {
                Ok(ExportOutcome::Saved(summary)) => {
                    Feedback::Message(format!(
                        "Saved to {} ({:.1} s)",
                        summary.path.display(),
                        summary.seconds()
                    ))
                }
                Ok(ExportOutcome::NothingToExport) => {
                    Feedback::Message("No recording to export.".to_string())
                }
                Err(e) => {
                    tracing::error!("export failed: {}", e);
                    Feedback::Message(format!("Export failed: {}", e))
                }
            },
            ControlAction::Silence => {
                engine.silence();
                Feedback::Message("All notes stopped".to_string())
            }
            ControlAction::ToggleHelp => Feedback::ToggleHelp,
            ControlAction::Quit => Feedback::Quit,
        }
    }
}

/// Bound piano key for a character event without Ctrl/Alt
fn piano_key(event: &KeyEvent, keymap: &KeyMap) -> Option<char> {
    if event.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return None;
    }
    match event.code {
        KeyCode::Char(c) => keymap.slot(c).map(|slot| slot.key),
        _ => None,
    }
}
