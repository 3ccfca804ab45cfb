// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Keyboard shortcut handling.
//!
//! Control commands (octave, volume, recording, ...) are bound to
//! shortcuts here. Piano keys are not shortcuts; they come from the
//! [`KeyMap`](crate::music::KeyMap) and are resolved by the dispatcher.

use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyModifiers};

use super::ControlAction;
use crate::music::KeyMap;

/// A keyboard shortcut definition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shortcut {
    /// Key code
    pub code: KeyCode,
    /// Required modifiers
    pub modifiers: KeyModifiers,
}

impl Shortcut {
    /// Create a new shortcut
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Create a shortcut with no modifiers
    pub fn key(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    /// Create a shortcut with Ctrl modifier
    pub fn ctrl(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::CONTROL)
    }
}

/// A keyboard binding (shortcut to action)
#[derive(Debug, Clone)]
pub struct KeyBinding {
    /// The shortcut
    pub shortcut: Shortcut,
    /// The action to perform
    pub action: ControlAction,
    /// Description for help display
    pub description: String,
    /// Category for grouping in help
    pub category: String,
}

impl KeyBinding {
    /// Create a new key binding
    pub fn new(shortcut: Shortcut, action: ControlAction, description: impl Into<String>) -> Self {
        Self {
            shortcut,
            action,
            description: description.into(),
            category: "General".to_string(),
        }
    }

    /// Set the category
    pub fn category(mut self, cat: impl Into<String>) -> Self {
        self.category = cat.into();
        self
    }
}

/// Keyboard controller with configurable bindings
#[derive(Debug, Clone)]
pub struct KeyboardController {
    bindings: HashMap<Shortcut, KeyBinding>,
}

impl KeyboardController {
    /// Create an empty keyboard controller
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Create a keyboard controller with default bindings
    pub fn with_defaults() -> Self {
        let mut controller = Self::new();
        controller.add_default_bindings();
        controller
    }

    fn add_default_bindings(&mut self) {
        // Pitch
        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Char('z')),
            ControlAction::OctaveDown,
            "Octave down",
        ).category("Pitch"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Char('x')),
            ControlAction::OctaveUp,
            "Octave up",
        ).category("Pitch"));

        // Volume
        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Up),
            ControlAction::VolumeUp,
            "Volume +10%",
        ).category("Volume"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Down),
            ControlAction::VolumeDown,
            "Volume -10%",
        ).category("Volume"));

        // Recording
        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Char('r')),
            ControlAction::ToggleRecord,
            "Start/stop recording",
        ).category("Recording"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Char('p')),
            ControlAction::Replay,
            "Play back recording",
        ).category("Recording"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Char('v')),
            ControlAction::Export,
            "Export recording to WAV",
        ).category("Recording"));

        // Sound
        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Char('m')),
            ControlAction::ToggleSustain,
            "Toggle sustain",
        ).category("Sound"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Char(' ')),
            ControlAction::Silence,
            "Stop all notes",
        ).category("Sound"));

        // UI
        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Char('?')),
            ControlAction::ToggleHelp,
            "Toggle help",
        ).category("UI"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Esc),
            ControlAction::Quit,
            "Quit",
        ).category("UI"));

        self.add(KeyBinding::new(
            Shortcut::ctrl(KeyCode::Char('c')),
            ControlAction::Quit,
            "Quit",
        ).category("UI"));
    }

    /// Add a key binding
    pub fn add(&mut self, binding: KeyBinding) {
        self.bindings.insert(binding.shortcut.clone(), binding);
    }

    /// Get action for a key event. Shift is ignored for character keys so
    /// caps lock and shifted letters behave like plain ones.
    pub fn get_action(&self, code: KeyCode, modifiers: KeyModifiers) -> Option<&ControlAction> {
        let shortcut = match code {
            KeyCode::Char(c) => Shortcut::new(
                KeyCode::Char(c.to_ascii_lowercase()),
                modifiers.difference(KeyModifiers::SHIFT),
            ),
            _ => Shortcut::new(code, modifiers),
        };
        self.bindings.get(&shortcut).map(|b| &b.action)
    }

    /// Get bindings grouped by category
    pub fn bindings_by_category(&self) -> HashMap<String, Vec<&KeyBinding>> {
        let mut grouped: HashMap<String, Vec<&KeyBinding>> = HashMap::new();

        for binding in self.bindings.values() {
            grouped
                .entry(binding.category.clone())
                .or_default()
                .push(binding);
        }

        grouped
    }

    /// Piano keys that are shadowed by an unmodified control shortcut
    pub fn conflicts(&self, keymap: &KeyMap) -> Vec<char> {
        let mut shadowed: Vec<char> = keymap
            .keys()
            .filter(|&key| {
                self.bindings
                    .contains_key(&Shortcut::key(KeyCode::Char(key)))
            })
            .collect();
        shadowed.sort_unstable();
        shadowed
    }
}

impl Default for KeyboardController {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Format a shortcut for display
pub fn format_shortcut(shortcut: &Shortcut) -> String {
    let mut parts = Vec::new();

    if shortcut.modifiers.contains(KeyModifiers::CONTROL) {
        parts.push("Ctrl");
    }
    if shortcut.modifiers.contains(KeyModifiers::ALT) {
        parts.push("Alt");
    }
    if shortcut.modifiers.contains(KeyModifiers::SHIFT) {
        parts.push("Shift");
    }

    let key = match shortcut.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_uppercase().to_string(),
        KeyCode::Up => "↑".to_string(),
        KeyCode::Down => "↓".to_string(),
        KeyCode::Left => "←".to_string(),
        KeyCode::Right => "→".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Enter => "Enter".to_string(),
        _ => "?".to_string(),
    };

    parts.push(&key);
    parts.join("+")
}
