// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Note registry for the piano.
//!
//! This module provides the fixed note frequency table and the
//! physical key bindings for white and black keys.

pub mod keymap;
pub mod note;

pub use keymap::{KeyColor, KeyMap, KeyMapError, KeySlot};
pub use note::{Note, BASE_OCTAVE};
