// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Audio output via cpal.
//!
//! Opens an output device at the synthesis sample rate and pulls mixed
//! audio from a callback. A device may be picked by name; otherwise the
//! host default is used.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, Device, SampleFormat, Stream, StreamConfig, SupportedBufferSize};

use super::AudioError;
use crate::synth::SAMPLE_RATE;

/// Audio output configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AudioConfig {
    /// Output device name; None picks the host default
    pub device: Option<String>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Requested buffer size in frames
    pub buffer_size: u32,
    /// Number of output channels
    pub channels: u16,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: SAMPLE_RATE,
            buffer_size: 512,
            channels: 2,
        }
    }
}

/// Audio output stream
pub struct AudioOutput {
    _stream: Stream,
    device_name: String,
    /// Buffer size the stream was opened with; None if the host chose
    buffer_size: Option<u32>,
    sample_rate: u32,
}

impl AudioOutput {
    /// Open the configured device and start pulling from `callback`,
    /// which fills interleaved f32 frames for the given channel count
    pub fn new<F>(config: AudioConfig, mut callback: F) -> Result<Self, AudioError>
    where
        F: FnMut(&mut [f32], usize) + Send + 'static,
    {
        let device = find_device(config.device.as_deref())?;
        let device_name = device.name().unwrap_or_else(|_| "unknown".to_string());

        let buffer_size = negotiate_buffer_size(&device, &config);
        let stream_config = StreamConfig {
            channels: config.channels,
            sample_rate: cpal::SampleRate(config.sample_rate),
            buffer_size: buffer_size.clone(),
        };

        let channels = config.channels as usize;
        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    data.fill(0.0);
                    callback(data, channels);
                },
                move |err| {
                    tracing::error!("audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| AudioError::StreamFailed(format!("{}: {}", device_name, e)))?;

        stream
            .play()
            .map_err(|e| AudioError::StreamFailed(format!("{}: {}", device_name, e)))?;

        Ok(Self {
            _stream: stream,
            device_name,
            buffer_size: match buffer_size {
                BufferSize::Fixed(frames) => Some(frames),
                BufferSize::Default => None,
            },
            sample_rate: config.sample_rate,
        })
    }

    /// Name of the device being played to
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Latency of one buffer in milliseconds, if the buffer size is known
    pub fn latency_ms(&self) -> Option<f64> {
        self.buffer_size
            .map(|frames| (frames as f64 / self.sample_rate as f64) * 1000.0)
    }
}

/// Look up an output device by name, or the host default
fn find_device(name: Option<&str>) -> Result<Device, AudioError> {
    let host = cpal::default_host();
    match name {
        None => host.default_output_device().ok_or(AudioError::NoDevice),
        Some(wanted) => host
            .output_devices()
            .map_err(|e| AudioError::StreamFailed(e.to_string()))?
            .find(|d| d.name().map(|n| n == wanted).unwrap_or(false))
            .ok_or_else(|| AudioError::UnknownDevice(wanted.to_string())),
    }
}

/// Pick a buffer size the device accepts for our format. Falls back to
/// the host default when the format is not advertised.
fn negotiate_buffer_size(device: &Device, config: &AudioConfig) -> BufferSize {
    let supported = match device.supported_output_configs() {
        Ok(configs) => configs
            .filter(|c| c.channels() == config.channels && c.sample_format() == SampleFormat::F32)
            .find(|c| {
                c.min_sample_rate().0 <= config.sample_rate && config.sample_rate <= c.max_sample_rate().0
            }),
        Err(e) => {
            tracing::warn!("could not query output formats: {}", e);
            None
        }
    };

    match supported {
        Some(range) => choose_buffer_size(range.buffer_size(), config.buffer_size),
        None => {
            tracing::warn!(
                channels = config.channels,
                sample_rate = config.sample_rate,
                "device does not advertise f32 output at this rate, trying anyway"
            );
            BufferSize::Default
        }
    }
}

/// Clamp the requested buffer into the supported range
fn choose_buffer_size(supported: &SupportedBufferSize, wanted: u32) -> BufferSize {
    match *supported {
        SupportedBufferSize::Range { min, max } if min <= max => {
            BufferSize::Fixed(wanted.clamp(min, max))
        }
        _ => BufferSize::Default,
    }
}

/// List available audio output devices
pub fn list_devices() -> Vec<String> {
    let host = cpal::default_host();
    host.output_devices()
        .map(|devices| devices.filter_map(|d| d.name().ok()).collect())
        .unwrap_or_default()
}

/// Get default device name
pub fn default_device_name() -> Option<String> {
    let host = cpal::default_host();
    host.default_output_device().and_then(|d| d.name().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_config_default() {
        let config = AudioConfig::default();
        assert_eq!(config.device, None);
        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.buffer_size, 512);
        assert_eq!(config.channels, 2);
    }

    #[test]
    fn test_buffer_size_inside_range() {
        let range = SupportedBufferSize::Range { min: 64, max: 4096 };
        assert_eq!(choose_buffer_size(&range, 512), BufferSize::Fixed(512));
    }

    #[test]
    fn test_buffer_size_clamped_to_range() {
        let range = SupportedBufferSize::Range { min: 256, max: 1024 };
        assert_eq!(choose_buffer_size(&range, 64), BufferSize::Fixed(256));
        assert_eq!(choose_buffer_size(&range, 4096), BufferSize::Fixed(1024));
    }

    #[test]
    fn test_unknown_buffer_range_uses_default() {
        assert_eq!(choose_buffer_size(&SupportedBufferSize::Unknown, 512), BufferSize::Default);
    }

    #[test]
    fn test_unknown_device_name() {
        let result = find_device(Some("no such device"));
        assert!(result.is_err());
    }
}
