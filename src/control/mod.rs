// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Control system for keyboard and mouse input.
//!
//! This module provides:
//! - Keyboard shortcut handling for control commands
//! - A single input event type for every input source
//! - The dispatcher that applies input events to the playback engine

pub mod dispatch;
pub mod keyboard;

pub use dispatch::InputDispatcher;
pub use keyboard::{format_shortcut, KeyBinding, KeyboardController, Shortcut};

/// Action that can be triggered by controls
#[derive(Debug, Clone, PartialEq)]
pub enum ControlAction {
    /// Shift down one octave
    OctaveDown,
    /// Shift up one octave
    OctaveUp,
    /// Raise volume one step
    VolumeUp,
    /// Lower volume one step
    VolumeDown,
    /// Start/stop recording
    ToggleRecord,
    /// Play back the recording
    Replay,
    /// Toggle sustain mode
    ToggleSustain,
    /// Export the recording to WAV
    Export,
    /// Stop every sounding note and any replay
    Silence,
    /// Toggle help display
    ToggleHelp,
    /// Quit application
    Quit,
}

/// Normalized input from any source
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A piano key went down
    KeyDown(char),
    /// A piano key came up
    KeyUp(char),
    /// A control command
    Command(ControlAction),
}

/// What the UI should do after an event was applied
#[derive(Debug, Clone, PartialEq)]
pub enum Feedback {
    /// Nothing to report
    None,
    /// Show a status message
    Message(String),
    /// Toggle the help overlay
    ToggleHelp,
    /// Exit the application
    Quit,
}
