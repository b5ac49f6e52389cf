use std::ops::Range;

/// Notification that new samples arrived during the last tick.
///
/// Borrows the recorder's sample buffer, so it cannot outlive the tick that
/// produced it. Listeners that need the data later must copy
/// [`new_samples`](Self::new_samples).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordingEvent<'a> {
    /// The whole sample buffer, oldest sample first.
    pub samples: &'a [f32],
    /// First index of the newly written range.
    pub start_index: usize,
    /// One past the last index of the newly written range.
    pub end_index: usize,
    pub sample_rate_hz: u32,
}

impl<'a> RecordingEvent<'a> {
    pub fn new(samples: &'a [f32], range: Range<usize>, sample_rate_hz: u32) -> Self {
        debug_assert!(range.start < range.end && range.end <= samples.len());
        Self {
            samples,
            start_index: range.start,
            end_index: range.end,
            sample_rate_hz,
        }
    }

    pub fn new_samples(&self) -> &'a [f32] {
        &self.samples[self.start_index..self.end_index]
    }

    pub fn range(&self) -> Range<usize> {
        self.start_index..self.end_index
    }

    pub fn len(&self) -> usize {
        self.end_index - self.start_index
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Duration covered by the new samples, in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate_hz == 0 {
            return 0.0;
        }
        self.len() as f64 / f64::from(self.sample_rate_hz)
    }
}
