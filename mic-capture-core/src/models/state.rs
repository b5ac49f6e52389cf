use std::time::Instant;

/// Recorder state machine.
///
/// State transitions:
/// ```text
/// idle → starting → recording
///   ↑       │           │
///   └───────┴───────────┘  (stop / timeout / cancel / buffer lost)
/// ```
///
/// `Starting` only exists while the device has been asked to capture but has
/// not yet advanced its write cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecorderState {
    #[default]
    Idle,
    Starting { deadline: Instant },
    Recording,
}

impl RecorderState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_starting(&self) -> bool {
        matches!(self, Self::Starting { .. })
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }

    /// Starting or recording, i.e. the device has been started.
    pub fn is_active(&self) -> bool {
        !self.is_idle()
    }
}
