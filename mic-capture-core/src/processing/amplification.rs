use std::ops::Range;

/// Multiplier value that disables amplification.
pub const NO_AMPLIFICATION: i32 = 0;

/// Multiply the samples in `range` by `multiplier` and clamp to `[-1.0, 1.0]`.
///
/// A multiplier of [`NO_AMPLIFICATION`] leaves the buffer untouched, including
/// any out-of-range values already in it. The range is clipped to the buffer.
pub fn apply_amplification(buffer: &mut [f32], range: Range<usize>, multiplier: i32) {
    if multiplier == NO_AMPLIFICATION {
        return;
    }
    let end = range.end.min(buffer.len());
    let start = range.start.min(end);
    let gain = multiplier as f32;
    for sample in &mut buffer[start..end] {
        *sample = (*sample * gain).clamp(-1.0, 1.0);
    }
}
