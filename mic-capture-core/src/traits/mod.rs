pub mod mic_device;
pub mod recording_listener;
