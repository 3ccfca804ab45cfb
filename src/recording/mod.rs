// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Recording and export system.
//!
//! This module provides:
//! - Capture of struck notes and their audio while recording
//! - Replay scheduling from the captured timestamps
//! - WAV file export

pub mod capture;
pub mod export;

pub use capture::{ExportOutcome, RecordedEvent, RecordingLog, RecordingState, ReplayStep};
pub use export::{ExportError, ExportSummary, WavExporter};
