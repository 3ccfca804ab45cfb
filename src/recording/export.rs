// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! WAV file export.
//!
//! Concatenates captured audio segments into a single mono 16-bit PCM
//! RIFF/WAVE file.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::synth::SAMPLE_RATE;

/// Errors raised while writing a WAV file
#[derive(Debug, Error)]
pub enum ExportError {
    /// The file could not be created or written
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },
}

/// What an export wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// Absolute path of the written file
    pub path: PathBuf,
    /// Number of samples written
    pub samples: usize,
    /// Number of segments concatenated
    pub segments: usize,
}

impl ExportSummary {
    /// Length of the written audio in seconds
    pub fn seconds(&self) -> f64 {
        crate::synth::duration_of(self.samples)
    }
}

/// WAV file exporter
#[derive(Debug, Clone)]
pub struct WavExporter {
    /// Sample rate in Hz
    sample_rate: u32,
}

impl WavExporter {
    /// Create an exporter at the synthesis sample rate
    pub fn new() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
        }
    }

    /// Get sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// WAV header settings (mono, 16-bit signed integer PCM)
    pub fn spec(&self) -> hound::WavSpec {
        hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        }
    }

    /// Write segments back to back, replacing any existing file
    pub fn export<S, P>(&self, segments: &[S], path: P) -> Result<ExportSummary, ExportError>
    where
        S: AsRef<[i16]>,
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let wrap = |source| ExportError::Write {
            path: path.to_path_buf(),
            source,
        };

        let mut writer = hound::WavWriter::create(path, self.spec()).map_err(wrap)?;
        let mut samples = 0;
        for segment in segments {
            for &sample in segment.as_ref() {
                writer.write_sample(sample).map_err(wrap)?;
            }
            samples += segment.as_ref().len();
        }
        writer.finalize().map_err(wrap)?;

        let resolved = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        tracing::info!(path = %resolved.display(), samples, "exported recording");

        Ok(ExportSummary {
            path: resolved,
            samples,
            segments: segments.len(),
        })
    }
}

impl Default for WavExporter {
    fn default() -> Self {
        Self::new()
    }
}
