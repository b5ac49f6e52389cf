use parking_lot::Mutex;

use crate::models::recording_event::RecordingEvent;
use crate::traits::recording_listener::RecordingListener;

/// Level of the most recent sample window (0.0–1.0).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MicLevels {
    pub rms: f32,
    pub peak: f32,
}

impl MicLevels {
    pub fn of(samples: &[f32]) -> Self {
        Self {
            rms: rms_level(samples),
            peak: peak_level(samples),
        }
    }
}

pub fn rms_level(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

pub fn peak_level(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max)
}

/// Listener that keeps the levels of the latest window and the peak seen
/// since the last [`reset`](Self::reset).
#[derive(Debug, Default)]
pub struct LevelMeter {
    inner: Mutex<LevelMeterState>,
}

#[derive(Debug, Default)]
struct LevelMeterState {
    current: MicLevels,
    held_peak: f32,
    windows: u64,
}

impl LevelMeter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> MicLevels {
        self.inner.lock().current
    }

    pub fn held_peak(&self) -> f32 {
        self.inner.lock().held_peak
    }

    /// Number of windows measured so far.
    pub fn windows(&self) -> u64 {
        self.inner.lock().windows
    }

    /// Whether the latest window rose above `threshold` RMS.
    pub fn is_above(&self, threshold: f32) -> bool {
        self.current().rms > threshold
    }

    pub fn reset(&self) {
        *self.inner.lock() = LevelMeterState::default();
    }
}

impl RecordingListener for LevelMeter {
    fn on_recording_event(&self, event: &RecordingEvent<'_>) {
        let levels = MicLevels::of(event.new_samples());
        let mut state = self.inner.lock();
        state.current = levels;
        state.held_peak = state.held_peak.max(levels.peak);
        state.windows += 1;
    }
}
