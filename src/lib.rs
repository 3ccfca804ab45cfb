// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! A terminal virtual piano.
//!
//! Keys of the computer keyboard play sine tones over a one-octave piano.
//! Notes can be recorded, replayed with their original timing and exported
//! to a WAV file.

pub mod audio;
pub mod config;
pub mod control;
pub mod engine;
pub mod music;
pub mod recording;
pub mod synth;
pub mod ui;
