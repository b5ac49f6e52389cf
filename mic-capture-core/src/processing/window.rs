//! Locating the samples that arrived since the previous tick.
//!
//! The sample buffer is refilled each tick so that the newest sample sits at
//! the highest index. The number of new samples is estimated from the frame
//! time rather than from the device cursor, so it can drift slightly from what
//! the device actually wrote.

use std::ops::Range;
use std::time::Duration;

/// `round(sample_rate_hz * elapsed)`.
pub fn samples_since_last_tick(sample_rate_hz: u32, elapsed: Duration) -> usize {
    (f64::from(sample_rate_hz) * elapsed.as_secs_f64()).round() as usize
}

/// Range of new samples at the high end of a buffer of `buffer_len` samples.
///
/// The count is capped at the buffer length. Returns `None` when nothing new
/// arrived, so a returned range is never empty.
pub fn new_sample_range(
    buffer_len: usize,
    sample_rate_hz: u32,
    elapsed: Duration,
) -> Option<Range<usize>> {
    let count = samples_since_last_tick(sample_rate_hz, elapsed).min(buffer_len);
    if count == 0 {
        return None;
    }
    Some(buffer_len - count..buffer_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sixty_fps_at_44_1_khz() {
        let elapsed = Duration::from_secs_f64(1.0 / 60.0);
        assert_eq!(samples_since_last_tick(44100, elapsed), 735);

        let range = new_sample_range(44100, 44100, elapsed).unwrap();
        assert_eq!(range, 43365..44100);
        assert_eq!(range.end - 1, 44099);
    }

    #[test]
    fn count_is_rounded_not_truncated() {
        // 48000 * 0.0166 = 796.8
        assert_eq!(samples_since_last_tick(48000, Duration::from_micros(16_600)), 797);
    }

    #[test]
    fn range_length_matches_estimate_for_many_frame_times() {
        let len = 48000;
        for micros in [1_000u64, 4_167, 8_333, 16_667, 33_333, 100_000] {
            let elapsed = Duration::from_micros(micros);
            let range = new_sample_range(len, 48000, elapsed).unwrap();
            assert_eq!(range.len(), samples_since_last_tick(48000, elapsed));
            assert_eq!(range.end, len);
            assert!(range.start < range.end);
        }
    }

    #[test]
    fn long_frames_are_capped_to_the_buffer() {
        let range = new_sample_range(1000, 1000, Duration::from_secs(3)).unwrap();
        assert_eq!(range, 0..1000);
    }

    #[test]
    fn nothing_new_yields_none() {
        assert_eq!(new_sample_range(1000, 44100, Duration::ZERO), None);
        assert_eq!(new_sample_range(0, 44100, Duration::from_millis(16)), None);
    }
}
