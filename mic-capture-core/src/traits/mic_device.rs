use crate::models::device::{ClipHandle, DeviceCaps};
use crate::models::error::CaptureError;

/// Interface to a platform's microphone subsystem.
///
/// The device owns the actual capture thread and writes into a looping clip.
/// The recorder only samples the write cursor and copies the clip once per tick.
///
/// Implemented by:
/// - `SimulatedMicDevice` (in-process, for tests and headless runs)
/// - `CpalMicDevice` (`mic-capture-cpal`)
pub trait MicDevice: Send {
    /// Names of the currently connected capture devices.
    fn device_names(&self) -> Vec<String>;

    /// Sample-rate range supported by the named device.
    fn device_caps(&self, name: &str) -> Result<DeviceCaps, CaptureError>;

    /// Start capturing from `name` into a clip of `length_secs * sample_rate_hz`
    /// samples. With `looping`, the write cursor wraps at the clip end.
    fn start(
        &mut self,
        name: &str,
        looping: bool,
        length_secs: u32,
        sample_rate_hz: u32,
    ) -> Result<ClipHandle, CaptureError>;

    /// Current write cursor into the clip of `name`, `0` if not capturing.
    fn position(&self, name: &str) -> usize;

    /// Fill `buffer` with clip samples starting at `offset`, wrapping around
    /// the clip end.
    ///
    /// Returns [`CaptureError::BufferUnavailable`] once the clip is gone.
    fn read_clip(
        &self,
        clip: ClipHandle,
        buffer: &mut [f32],
        offset: usize,
    ) -> Result<(), CaptureError>;

    /// Stop capturing from `name`. Unknown or stopped devices are ignored.
    fn end(&mut self, name: &str);
}
