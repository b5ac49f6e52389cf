//! # mic-capture-core
//!
//! Platform-agnostic microphone sample acquisition.
//!
//! A [`MicSampleRecorder`] polls a [`MicDevice`] once per frame, copies the
//! device's looping clip into a one-second sample buffer, amplifies the
//! samples that arrived since the previous frame and publishes them as a
//! [`RecordingEvent`] to pitch detectors, level meters and note displays.
//! Platform backends (cpal, the in-process [`SimulatedMicDevice`]) implement
//! the `MicDevice` trait.
//!
//! ## Architecture
//!
//! ```text
//! mic-capture-core (this crate)
//! ├── traits/       ← MicDevice, RecordingListener
//! ├── models/       ← CaptureError, RecorderState, MicProfile, RecorderConfig, RecordingEvent
//! ├── processing/   ← amplification, new-sample window, LoopClip, level metering
//! ├── session/      ← MicSampleRecorder (frame-driven state machine), CancelToken
//! ├── timing/       ← SongTiming (playback position ↔ beat, mic delay)
//! └── backends/     ← SimulatedMicDevice
//! ```

#![deny(rustdoc::broken_intra_doc_links)]

pub mod backends;
pub mod models;
pub mod processing;
pub mod session;
pub mod timing;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use backends::simulated::SimulatedMicDevice;
pub use models::config::{RecorderConfig, DEFAULT_SAMPLE_RATE_HZ};
pub use models::device::{ClipHandle, DeviceCaps, RecorderDiagnostics};
pub use models::error::CaptureError;
pub use models::profile::{MicProfile, MicSettings};
pub use models::recording_event::RecordingEvent;
pub use models::state::RecorderState;
pub use processing::clip::LoopClip;
pub use processing::levels::{LevelMeter, MicLevels};
pub use session::cancel::CancelToken;
pub use session::recorder::MicSampleRecorder;
pub use timing::song_timing::SongTiming;
pub use traits::mic_device::MicDevice;
pub use traits::recording_listener::{FnListener, RecordingListener, SubscriptionId};
