pub mod config;
pub mod device;
pub mod error;
pub mod profile;
pub mod recording_event;
pub mod state;
