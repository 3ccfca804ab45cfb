// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Sine tone generation.

use std::f64::consts::PI;

use crate::music::Note;

/// Output sample rate in Hz (mono)
pub const SAMPLE_RATE: u32 = 44100;

/// Largest sample magnitude after normalization
pub const PEAK: i16 = i16::MAX;

/// Longest tone that will be synthesized, in seconds
pub const MAX_DURATION: f64 = 60.0;

/// Number of samples needed for a duration in seconds, capped at
/// [`MAX_DURATION`]
pub fn sample_count(duration: f64) -> usize {
    if !duration.is_finite() || duration <= 0.0 {
        return 0;
    }
    (SAMPLE_RATE as f64 * duration.min(MAX_DURATION)).round() as usize
}

/// Synthesize a sine tone for a note shifted by whole octaves.
///
/// The buffer is normalized so its loudest sample is exactly [`PEAK`].
/// Non-positive or non-finite durations produce an empty buffer.
pub fn synthesize(note: Note, octave_shift: i32, duration: f64) -> Vec<i16> {
    sine(note.frequency(octave_shift), duration)
}

/// Synthesize a normalized sine wave at an arbitrary frequency
pub fn sine(frequency: f64, duration: f64) -> Vec<i16> {
    let len = sample_count(duration);
    if len == 0 || !frequency.is_finite() {
        return Vec::new();
    }

    let step = 2.0 * PI * frequency / SAMPLE_RATE as f64;
    let raw: Vec<f64> = (0..len).map(|i| (step * i as f64).sin()).collect();

    let peak = raw.iter().fold(0.0f64, |acc, s| acc.max(s.abs()));
    if peak == 0.0 {
        return vec![0; len];
    }

    // s / peak is exactly +-1.0 at the peak, so the scaled value lands on PEAK
    raw.iter()
        .map(|s| (s / peak * PEAK as f64) as i16)
        .collect()
}

/// Duration in seconds of a number of mono samples
pub fn duration_of(samples: usize) -> f64 {
    samples as f64 / SAMPLE_RATE as f64
}
