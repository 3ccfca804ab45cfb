// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Tone synthesis.
//!
//! Pure functions turning a note and octave into 16-bit mono PCM at
//! [`SAMPLE_RATE`]. No envelope or harmonics: every tone is a raw sine.

pub mod tone;

pub use tone::{duration_of, sample_count, sine, synthesize, MAX_DURATION, PEAK, SAMPLE_RATE};
