use thiserror::Error;

/// Errors that can occur while acquiring microphone samples.
///
/// None of these are fatal to the host process. The recorder logs each one,
/// forwards it to its listeners and falls back to the idle state where needed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("did not find mic '{name}'. Available mic devices: {available}")]
    DeviceNotFound { name: String, available: String },

    #[error("mic '{name}' did not deliver samples within {waited_ms} ms")]
    CaptureStartTimeout { name: String, waited_ms: u64 },

    #[error("audio buffer for microphone is unavailable")]
    BufferUnavailable,

    #[error("start of recording was cancelled")]
    StartCancelled,

    #[error("no mic profile set")]
    NoProfile,

    #[error("device query failed: {0}")]
    DeviceQueryFailed(String),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("backend error: {0}")]
    Backend(String),
}
