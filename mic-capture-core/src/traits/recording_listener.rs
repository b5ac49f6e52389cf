use crate::models::error::CaptureError;
use crate::models::recording_event::RecordingEvent;
use crate::models::state::RecorderState;

/// Subscriber for recorder notifications.
///
/// All methods are called synchronously from the recorder's tick, on the
/// caller's thread. The event's slice is overwritten on the next tick, so
/// implementations must finish reading (or copy) before returning.
pub trait RecordingListener: Send + Sync {
    /// Called once per tick with the newly captured sample range.
    fn on_recording_event(&self, event: &RecordingEvent<'_>);

    /// Called when the recorder state changes.
    fn on_state_changed(&self, _state: &RecorderState) {}

    /// Called when capture fails to start or is aborted.
    fn on_error(&self, _error: &CaptureError) {}
}

/// Adapter turning a closure into a [`RecordingListener`].
pub struct FnListener<F>(pub F);

impl<F> RecordingListener for FnListener<F>
where
    F: Fn(&RecordingEvent<'_>) + Send + Sync,
{
    fn on_recording_event(&self, event: &RecordingEvent<'_>) {
        (self.0)(event)
    }
}

/// Identifies a subscription so it can be removed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);
