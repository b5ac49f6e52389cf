//! Input device enumeration via cpal.
//!
//! Devices are addressed by their friendly name, which is what mic profiles
//! store.

use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{SampleFormat, SampleRate, SupportedStreamConfig, SupportedStreamConfigRange};

use mic_capture_core::models::device::DeviceCaps;
use mic_capture_core::models::error::CaptureError;

/// Input devices of a cpal host.
pub struct DeviceEnumerator<'a> {
    host: &'a cpal::Host,
}

impl<'a> DeviceEnumerator<'a> {
    pub fn new(host: &'a cpal::Host) -> Self {
        Self { host }
    }

    /// Names of active input devices. Unnamed devices are skipped.
    pub fn list_input_names(&self) -> Result<Vec<String>, CaptureError> {
        let devices = self
            .host
            .input_devices()
            .map_err(|e| CaptureError::DeviceQueryFailed(e.to_string()))?;
        Ok(devices.filter_map(|d| d.name().ok()).collect())
    }

    pub fn find_input(&self, name: &str) -> Result<cpal::Device, CaptureError> {
        let mut devices = self
            .host
            .input_devices()
            .map_err(|e| CaptureError::DeviceQueryFailed(e.to_string()))?;
        devices
            .find(|d| d.name().map(|n| n == name).unwrap_or(false))
            .ok_or_else(|| CaptureError::DeviceNotFound {
                name: name.to_string(),
                available: self.list_input_names().unwrap_or_default().join(","),
            })
    }

    /// Sample-rate range across all configurations the device supports.
    pub fn caps(&self, name: &str) -> Result<DeviceCaps, CaptureError> {
        let device = self.find_input(name)?;
        let ranges = device
            .supported_input_configs()
            .map_err(|e| CaptureError::DeviceQueryFailed(e.to_string()))?;
        Ok(caps_of(ranges))
    }
}

/// Preference of the sample formats the capture stream can convert.
/// `None` for formats it cannot open.
fn format_score(format: SampleFormat) -> Option<i32> {
    match format {
        SampleFormat::F32 => Some(3),
        SampleFormat::I16 => Some(2),
        SampleFormat::U16 => Some(1),
        _ => None,
    }
}

/// Sample-rate span of the ranges a capture stream can actually open.
pub(crate) fn caps_of(ranges: impl Iterator<Item = SupportedStreamConfigRange>) -> DeviceCaps {
    let mut caps: Option<DeviceCaps> = None;
    for range in ranges.filter(|r| format_score(r.sample_format()).is_some()) {
        let min = range.min_sample_rate().0;
        let max = range.max_sample_rate().0;
        caps = Some(match caps {
            Some(c) => DeviceCaps::new(c.min_frequency_hz.min(min), c.max_frequency_hz.max(max)),
            None => DeviceCaps::new(min, max),
        });
    }
    // No usable ranges: let the recorder fall back to its default rate
    caps.unwrap_or_default()
}

/// Pick a configuration that supports `sample_rate_hz`, preferring fewer
/// channels and then F32 over I16 over U16 samples.
pub(crate) fn select_input_config(
    ranges: impl Iterator<Item = SupportedStreamConfigRange>,
    sample_rate_hz: u32,
) -> Result<SupportedStreamConfig, CaptureError> {
    let mut best: Option<(i32, SupportedStreamConfigRange)> = None;

    for range in ranges {
        if sample_rate_hz < range.min_sample_rate().0 || sample_rate_hz > range.max_sample_rate().0 {
            continue;
        }
        let Some(preference) = format_score(range.sample_format()) else {
            continue;
        };
        let score = preference - i32::from(range.channels()) * 10;
        if best.as_ref().map(|(s, _)| score > *s).unwrap_or(true) {
            best = Some((score, range));
        }
    }

    best.map(|(_, range)| range.with_sample_rate(SampleRate(sample_rate_hz)))
        .ok_or_else(|| {
            CaptureError::Backend(format!("no input config supports {} Hz", sample_rate_hz))
        })
}
