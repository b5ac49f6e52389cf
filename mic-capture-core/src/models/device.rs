/// Sample-rate range a capture device advertises.
///
/// A range of `0..=0` means the device accepts any frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceCaps {
    pub min_frequency_hz: u32,
    pub max_frequency_hz: u32,
}

impl DeviceCaps {
    pub fn new(min_frequency_hz: u32, max_frequency_hz: u32) -> Self {
        Self {
            min_frequency_hz,
            max_frequency_hz,
        }
    }

    pub fn supports_any_frequency(&self) -> bool {
        self.min_frequency_hz == 0 && self.max_frequency_hz == 0
    }

    /// The rate to record at: the device maximum, or `fallback_hz` when the
    /// device accepts anything.
    pub fn recording_rate(&self, fallback_hz: u32) -> u32 {
        if self.max_frequency_hz == 0 {
            fallback_hz
        } else {
            self.max_frequency_hz
        }
    }
}

/// Opaque handle to a looping clip that a device writes captured audio into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClipHandle(pub u64);

/// Counters for debugging a recorder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecorderDiagnostics {
    pub ticks: u64,
    pub events_published: u64,
    pub samples_published: u64,
    pub start_attempts: u64,
    pub start_timeouts: u64,
    pub buffer_losses: u64,
}
