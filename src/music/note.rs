// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Note names and their base frequencies.
//!
//! The playable range is one octave from middle C up to the C above it.
//! Frequencies are tuned for the reference octave and shifted by powers
//! of two for the other octaves.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Octave the frequency table is tuned for
pub const BASE_OCTAVE: i32 = 4;

/// Playable notes (one chromatic octave plus the upper C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Note {
    C,
    Cs, // C#
    D,
    Ds, // D#
    E,
    F,
    Fs, // F#
    G,
    Gs, // G#
    A,
    As, // A#
    B,
    CHigh, // C+ (C one octave up)
}

impl Note {
    /// All notes in ascending order
    pub const ALL: [Note; 13] = [
        Note::C,
        Note::Cs,
        Note::D,
        Note::Ds,
        Note::E,
        Note::F,
        Note::Fs,
        Note::G,
        Note::Gs,
        Note::A,
        Note::As,
        Note::B,
        Note::CHigh,
    ];

    /// Frequency in Hz at the base octave
    pub fn base_frequency(self) -> f64 {
        match self {
            Note::C => 261.63,
            Note::Cs => 277.18,
            Note::D => 293.66,
            Note::Ds => 311.13,
            Note::E => 329.63,
            Note::F => 349.23,
            Note::Fs => 369.99,
            Note::G => 392.00,
            Note::Gs => 415.30,
            Note::A => 440.00,
            Note::As => 466.16,
            Note::B => 493.88,
            Note::CHigh => 523.25,
        }
    }

    /// Frequency in Hz shifted by whole octaves from the base octave
    pub fn frequency(self, octave_shift: i32) -> f64 {
        self.base_frequency() * 2f64.powi(octave_shift)
    }

    /// Display name (e.g., "C", "F#", "C+")
    pub fn name(self) -> &'static str {
        match self {
            Note::C => "C",
            Note::Cs => "C#",
            Note::D => "D",
            Note::Ds => "D#",
            Note::E => "E",
            Note::F => "F",
            Note::Fs => "F#",
            Note::G => "G",
            Note::Gs => "G#",
            Note::A => "A",
            Note::As => "A#",
            Note::B => "B",
            Note::CHigh => "C+",
        }
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_frequencies() {
        assert_eq!(Note::A.base_frequency(), 440.0);
        assert_eq!(Note::C.base_frequency(), 261.63);
        assert_eq!(Note::CHigh.base_frequency(), 523.25);
    }

    #[test]
    fn test_frequencies_ascend() {
        for pair in Note::ALL.windows(2) {
            assert!(pair[0].base_frequency() < pair[1].base_frequency());
        }
    }

    #[test]
    fn test_octave_shift() {
        assert_eq!(Note::A.frequency(0), 440.0);
        assert_eq!(Note::A.frequency(1), 880.0);
        assert_eq!(Note::A.frequency(-2), 110.0);
    }

    #[test]
    fn test_note_display() {
        assert_eq!(Note::As.to_string(), "A#");
        assert_eq!(format!("{}{}", Note::CHigh, 4), "C+4");
    }
}
