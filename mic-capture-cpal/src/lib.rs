//! # mic-capture-cpal
//!
//! cpal backend for mic-capture.
//!
//! Provides:
//! - `CpalMicDevice` — `MicDevice` implementation over cpal input streams
//! - `DeviceEnumerator` — input device listing and sample-rate caps
//!
//! ## Usage
//! ```ignore
//! use std::time::Duration;
//! use mic_capture_cpal::CpalMicDevice;
//! use mic_capture_core::{MicProfile, MicSampleRecorder};
//!
//! let mut recorder = MicSampleRecorder::with_default_config(CpalMicDevice::new());
//! recorder.set_profile(Some(MicProfile::new("USB Microphone")));
//! recorder.start_recording()?;
//! loop {
//!     recorder.tick(Duration::from_millis(16));
//! }
//! ```

pub mod cpal_mic;
pub mod device_enumerator;

pub use cpal_mic::CpalMicDevice;
pub use device_enumerator::DeviceEnumerator;
