// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration system for the piano.
//!
//! This module provides the YAML configuration file: playback defaults,
//! key bindings, audio output, export and logging settings. Every field
//! has a default so an empty file is valid.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::audio::AudioConfig;
use crate::music::keymap::{DEFAULT_BLACK_KEYS, DEFAULT_WHITE_KEYS};
use crate::music::{KeyMap, BASE_OCTAVE};
use crate::synth::{MAX_DURATION, SAMPLE_RATE};

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PianoConfig {
    /// Playback defaults
    #[serde(default)]
    pub playback: PlaybackConfig,
    /// Key bindings
    #[serde(default)]
    pub keys: KeysConfig,
    /// Audio output settings
    #[serde(default)]
    pub audio: AudioSection,
    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PianoConfig {
    /// Load a configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        Self::from_yaml(&contents)
    }

    /// Parse a configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration to YAML")
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = self.to_yaml()?;
        fs::write(path.as_ref(), yaml)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        self.keys.keymap()?;
        self.logging.level()?;
        check_duration("playback.hold_duration", self.playback.hold_duration)?;
        check_duration("playback.replay_note_duration", self.playback.replay_note_duration)?;
        if self.audio.channels == 0 {
            return Err(anyhow!("audio.channels must be at least 1"));
        }
        Ok(())
    }
}

fn check_duration(name: &str, seconds: f64) -> Result<()> {
    if seconds > 0.0 && seconds <= MAX_DURATION {
        Ok(())
    } else {
        Err(anyhow!("{} must be in (0, {}] seconds, got {}", name, MAX_DURATION, seconds))
    }
}

/// Playback defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaybackConfig {
    /// Starting octave (clamped to 2-6)
    #[serde(default = "default_octave")]
    pub octave: i32,
    /// Starting volume (0.0 - 1.0)
    #[serde(default = "default_volume")]
    pub volume: f32,
    /// Start with sustain on
    #[serde(default = "default_sustain")]
    pub sustain: bool,
    /// Seconds of tone synthesized for a held key
    #[serde(default = "default_hold_duration")]
    pub hold_duration: f64,
    /// Seconds each note lasts on replay
    #[serde(default = "default_replay_note_duration")]
    pub replay_note_duration: f64,
}

fn default_octave() -> i32 {
    BASE_OCTAVE
}
fn default_volume() -> f32 {
    0.5
}
fn default_sustain() -> bool {
    true
}
fn default_hold_duration() -> f64 {
    5.0
}
fn default_replay_note_duration() -> f64 {
    0.5
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            octave: default_octave(),
            volume: default_volume(),
            sustain: default_sustain(),
            hold_duration: default_hold_duration(),
            replay_note_duration: default_replay_note_duration(),
        }
    }
}

/// Key bindings; an empty string leaves a slot unbound
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeysConfig {
    /// White keys for C D E F G A B C+
    #[serde(default = "default_white_keys")]
    pub white: Vec<String>,
    /// Black keys for C# D# - F# G# A# - -
    #[serde(default = "default_black_keys")]
    pub black: Vec<String>,
}

fn default_white_keys() -> Vec<String> {
    DEFAULT_WHITE_KEYS.iter().map(|c| c.to_string()).collect()
}
fn default_black_keys() -> Vec<String> {
    DEFAULT_BLACK_KEYS
        .iter()
        .map(|c| c.map(String::from).unwrap_or_default())
        .collect()
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            white: default_white_keys(),
            black: default_black_keys(),
        }
    }
}

impl KeysConfig {
    /// Build the key map
    pub fn keymap(&self) -> Result<KeyMap> {
        KeyMap::from_strings(&self.white, &self.black).context("Invalid key bindings")
    }
}

/// Audio output settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudioSection {
    /// Output device name (see --list-devices); default device if unset
    #[serde(default)]
    pub device: Option<String>,
    /// Buffer size in frames (64 - 4096)
    #[serde(default = "default_buffer_size")]
    pub buffer_size: u32,
    /// Output channels
    #[serde(default = "default_channels")]
    pub channels: u16,
}

fn default_buffer_size() -> u32 {
    512
}
fn default_channels() -> u16 {
    2
}

impl Default for AudioSection {
    fn default() -> Self {
        Self {
            device: None,
            buffer_size: default_buffer_size(),
            channels: default_channels(),
        }
    }
}

impl AudioSection {
    /// Output configuration at the synthesis sample rate
    pub fn output_config(&self) -> AudioConfig {
        AudioConfig {
            device: self.device.clone(),
            sample_rate: SAMPLE_RATE,
            buffer_size: self.buffer_size.clamp(64, 4096),
            channels: self.channels,
        }
    }
}

/// Export settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportConfig {
    /// WAV file written on export (relative to the working directory)
    #[serde(default = "default_export_path")]
    pub path: PathBuf,
}

fn default_export_path() -> PathBuf {
    PathBuf::from("piano_recording.wav")
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            path: default_export_path(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file (the terminal is owned by the UI)
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_file() -> PathBuf {
    PathBuf::from("piano.log")
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

impl LoggingConfig {
    /// Parsed log level
    pub fn level(&self) -> Result<Level> {
        self.level
            .parse::<Level>()
            .map_err(|_| anyhow!("Unknown log level: {}", self.level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::music::Note;
    use tempfile::tempdir;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = PianoConfig::from_yaml("{}").unwrap();
        assert_eq!(config, PianoConfig::default());
        assert_eq!(config.playback.octave, 4);
        assert_eq!(config.playback.volume, 0.5);
        assert!(config.playback.sustain);
        assert_eq!(config.playback.hold_duration, 5.0);
        assert_eq!(config.playback.replay_note_duration, 0.5);
        assert_eq!(config.export.path, PathBuf::from("piano_recording.wav"));
    }

    #[test]
    fn test_default_keys_build_default_keymap() {
        let keymap = KeysConfig::default().keymap().unwrap();
        assert_eq!(keymap.note_for('a'), Some(Note::C));
        assert_eq!(keymap.note_for('u'), Some(Note::As));
        assert_eq!(keymap.black_keys().len(), 5);
    }

    #[test]
    fn test_parse_partial_config() {
        let yaml = r#"
playback:
  octave: 3
  sustain: false
keys:
  white: ["1", "2", "3", "4", "5", "6", "7", "8"]
logging:
  level: debug
"#;
        let config = PianoConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.playback.octave, 3);
        assert!(!config.playback.sustain);
        assert_eq!(config.playback.volume, 0.5);
        assert_eq!(config.keys.keymap().unwrap().note_for('8'), Some(Note::CHigh));
        assert_eq!(config.logging.level().unwrap(), Level::DEBUG);
    }

    #[test]
    fn test_invalid_keys_rejected() {
        let yaml = r#"
keys:
  black: ["w", "e", "r", "t", "y", "u", "", ""]
"#;
        assert!(PianoConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_invalid_durations_rejected() {
        assert!(PianoConfig::from_yaml("playback:\n  hold_duration: 0\n").is_err());
        assert!(PianoConfig::from_yaml("playback:\n  replay_note_duration: -1\n").is_err());
        assert!(PianoConfig::from_yaml("playback:\n  hold_duration: .nan\n").is_err());
    }

    #[test]
    fn test_oversized_durations_rejected() {
        assert!(PianoConfig::from_yaml("playback:\n  hold_duration: 1.0e15\n").is_err());
        assert!(PianoConfig::from_yaml("playback:\n  replay_note_duration: 61\n").is_err());
        assert!(PianoConfig::from_yaml("playback:\n  hold_duration: 60\n").is_ok());
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        assert!(PianoConfig::from_yaml("logging:\n  level: loud\n").is_err());
    }

    #[test]
    fn test_output_config_clamps_buffer() {
        let section = AudioSection {
            device: Some("Speakers".to_string()),
            buffer_size: 8,
            channels: 1,
        };
        let output = section.output_config();
        assert_eq!(output.device.as_deref(), Some("Speakers"));
        assert_eq!(output.sample_rate, 44100);
        assert_eq!(output.buffer_size, 64);
        assert_eq!(output.channels, 1);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("piano.yaml");

        let mut config = PianoConfig::default();
        config.playback.volume = 0.8;
        config.export.path = PathBuf::from("take.wav");
        config.save(&path).unwrap();

        let loaded = PianoConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        assert!(PianoConfig::load(dir.path().join("missing.yaml")).is_err());
    }

    #[test]
    fn test_load_invalid_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("invalid.yaml");
        fs::write(&path, "this is not valid yaml: [").unwrap();
        assert!(PianoConfig::load(&path).is_err());
    }
}
