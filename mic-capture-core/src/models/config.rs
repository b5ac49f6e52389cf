use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Sample rate used until a profile reports the device's capabilities.
pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 44100;

/// Configuration for a [`MicSampleRecorder`](crate::MicSampleRecorder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecorderConfig {
    /// Sample rate used when no device caps are known, or when the device
    /// reports that it supports any frequency (default: 44100).
    pub default_sample_rate_hz: u32,

    /// Length of the looping device clip in seconds (default: 1).
    pub clip_length_secs: u32,

    /// How long a started device may take to report its first sample
    /// (default: 1000 ms).
    pub start_timeout_ms: u64,

    /// Sleep between position checks in
    /// [`start_recording_blocking`](crate::MicSampleRecorder::start_recording_blocking)
    /// (default: 5 ms).
    pub start_poll_interval_ms: u64,
}

impl RecorderConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.default_sample_rate_hz == 0 {
            return Err("default sample rate must be positive".into());
        }
        if self.clip_length_secs == 0 {
            return Err("clip length must be at least one second".into());
        }
        if self.start_timeout_ms == 0 {
            return Err("start timeout must be positive".into());
        }
        if self.start_poll_interval_ms > self.start_timeout_ms {
            return Err(format!(
                "poll interval ({} ms) exceeds start timeout ({} ms)",
                self.start_poll_interval_ms, self.start_timeout_ms
            ));
        }
        Ok(())
    }

    pub fn start_timeout(&self) -> Duration {
        Duration::from_millis(self.start_timeout_ms)
    }

    pub fn start_poll_interval(&self) -> Duration {
        Duration::from_millis(self.start_poll_interval_ms)
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            default_sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
            clip_length_secs: 1,
            start_timeout_ms: 1000,
            start_poll_interval_ms: 5,
        }
    }
}
