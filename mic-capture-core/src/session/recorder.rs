use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::models::config::RecorderConfig;
use crate::models::device::{ClipHandle, RecorderDiagnostics};
use crate::models::error::CaptureError;
use crate::models::profile::MicProfile;
use crate::models::recording_event::RecordingEvent;
use crate::models::state::RecorderState;
use crate::processing::amplification::{apply_amplification, NO_AMPLIFICATION};
use crate::processing::window;
use crate::session::cancel::CancelToken;
use crate::traits::mic_device::MicDevice;
use crate::traits::recording_listener::{FnListener, RecordingListener, SubscriptionId};

/// The device capture started by the last successful `start_recording`.
struct ActiveCapture {
    device_name: String,
    clip: ClipHandle,
    clip_len: usize,
}

/// Frame-driven microphone sample recorder.
///
/// Generic over the platform backend via the [`MicDevice`] trait. Each call to
/// [`tick`](Self::tick) copies the device clip into a buffer of one second,
/// newest sample last, amplifies the samples that arrived since the previous
/// tick and publishes them to all listeners.
///
/// ```text
/// [MicDevice clip] → read at cursor → [sample buffer] → amplify new range
///                                                     → RecordingEvent → listeners
/// ```
///
/// Everything runs on the caller's thread. Starting is non-blocking: the
/// device is started and the recorder stays in `Starting` until the device
/// cursor moves or the start timeout expires.
pub struct MicSampleRecorder<D: MicDevice> {
    device: D,
    config: RecorderConfig,
    profile: Option<MicProfile>,
    state: RecorderState,
    sample_rate_hz: u32,
    samples: Vec<f32>,
    active: Option<ActiveCapture>,
    amplify_multiplier: i32,
    listeners: Vec<(SubscriptionId, Arc<dyn RecordingListener>)>,
    next_subscription: u64,
    diagnostics: RecorderDiagnostics,
}

impl<D: MicDevice> MicSampleRecorder<D> {
    pub fn new(device: D, config: RecorderConfig) -> Result<Self, CaptureError> {
        config.validate().map_err(CaptureError::ConfigurationFailed)?;
        Ok(Self::build(device, config))
    }

    pub fn with_default_config(device: D) -> Self {
        Self::build(device, RecorderConfig::default())
    }

    fn build(device: D, config: RecorderConfig) -> Self {
        let sample_rate_hz = config.default_sample_rate_hz;
        Self {
            device,
            config,
            profile: None,
            state: RecorderState::Idle,
            sample_rate_hz,
            samples: vec![0.0; sample_rate_hz as usize],
            active: None,
            amplify_multiplier: NO_AMPLIFICATION,
            listeners: Vec::new(),
            next_subscription: 0,
            diagnostics: RecorderDiagnostics::default(),
        }
    }

    // --- Accessors ---

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state.is_recording()
    }

    pub fn profile(&self) -> Option<&MicProfile> {
        self.profile.as_ref()
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    /// The sample buffer as of the last tick, oldest sample first.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn diagnostics(&self) -> RecorderDiagnostics {
        self.diagnostics.clone()
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    // --- Listeners ---

    pub fn subscribe(&mut self, listener: Arc<dyn RecordingListener>) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.listeners.push((id, listener));
        id
    }

    pub fn subscribe_fn<F>(&mut self, f: F) -> SubscriptionId
    where
        F: Fn(&RecordingEvent<'_>) + Send + Sync + 'static,
    {
        self.subscribe(Arc::new(FnListener(f)))
    }

    /// Returns `false` if the subscription was already removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    // --- Profile ---

    /// Switch to a different mic profile.
    ///
    /// Stops any active capture. For a profile with a device name, the buffer
    /// is resized to the device's maximum sample rate and capture is restarted
    /// if it was active before. `None` or a blank name only stops.
    pub fn set_profile(&mut self, profile: Option<MicProfile>) {
        let restart = self.state.is_active();
        if restart {
            self.stop_recording();
        }

        self.profile = profile;
        let name = match &self.profile {
            Some(p) if p.has_device_name() => p.name.clone(),
            _ => return,
        };

        match self.device.device_caps(&name) {
            Ok(caps) => {
                log::info!(
                    "Mic frequency range: {} - {} Hz",
                    caps.min_frequency_hz,
                    caps.max_frequency_hz
                );
                self.sample_rate_hz = caps.recording_rate(self.config.default_sample_rate_hz);
                self.samples = vec![0.0; self.sample_rate_hz as usize];
            }
            Err(e) => {
                log::warn!("Could not query caps of mic '{}': {}", name, e);
                self.notify_error(&e);
            }
        }

        if restart {
            // Failures are logged and reported to listeners.
            let _ = self.start_recording();
        }
    }

    // --- Capture control ---

    /// Start the device without waiting for its first sample.
    ///
    /// Already starting or recording is a no-op. On failure the recorder
    /// stays idle and the error is logged and reported to listeners.
    pub fn start_recording(&mut self) -> Result<(), CaptureError> {
        self.start_recording_at(Instant::now())
    }

    pub fn start_recording_at(&mut self, now: Instant) -> Result<(), CaptureError> {
        if self.state.is_active() {
            return Ok(());
        }

        let profile = match &self.profile {
            Some(p) if p.has_device_name() => p.clone(),
            _ => return Err(self.fail(CaptureError::NoProfile)),
        };
        self.diagnostics.start_attempts += 1;

        let devices = self.device.device_names();
        if !devices.iter().any(|d| d == &profile.name) {
            return Err(self.fail(CaptureError::DeviceNotFound {
                name: profile.name,
                available: devices.join(","),
            }));
        }
        log::info!("Starting recording with '{}'", profile.name);

        self.amplify_multiplier = profile.amplification_multiplier();

        let clip = match self.device.start(
            &profile.name,
            true,
            self.config.clip_length_secs,
            self.sample_rate_hz,
        ) {
            Ok(clip) => clip,
            Err(e) => return Err(self.fail(e)),
        };
        self.active = Some(ActiveCapture {
            device_name: profile.name,
            clip,
            clip_len: self.config.clip_length_secs as usize * self.sample_rate_hz as usize,
        });
        self.set_state(RecorderState::Starting {
            deadline: now + self.config.start_timeout(),
        });

        self.poll_start(now).map(|_| ())
    }

    /// Advance a pending start. Returns whether the recorder is recording.
    ///
    /// Past the deadline the device is ended and
    /// [`CaptureError::CaptureStartTimeout`] is returned.
    pub fn poll_start(&mut self, now: Instant) -> Result<bool, CaptureError> {
        let deadline = match self.state {
            RecorderState::Recording => return Ok(true),
            RecorderState::Idle => return Ok(false),
            RecorderState::Starting { deadline } => deadline,
        };
        let Some(name) = self.active.as_ref().map(|a| a.device_name.clone()) else {
            self.set_state(RecorderState::Idle);
            return Ok(false);
        };

        if self.device.position(&name) > 0 {
            log::debug!("Mic '{}' delivered its first samples", name);
            self.set_state(RecorderState::Recording);
            return Ok(true);
        }

        if now > deadline {
            self.release_device();
            self.diagnostics.start_timeouts += 1;
            self.set_state(RecorderState::Idle);
            return Err(self.fail(CaptureError::CaptureStartTimeout {
                name,
                waited_ms: self.config.start_timeout_ms,
            }));
        }
        Ok(false)
    }

    /// Start and block until the first sample, the timeout or cancellation.
    ///
    /// Sleeps for the configured poll interval between checks.
    pub fn start_recording_blocking(&mut self, cancel: &CancelToken) -> Result<(), CaptureError> {
        self.start_recording()?;
        loop {
            if cancel.is_cancelled() {
                self.cancel_start();
                return Err(CaptureError::StartCancelled);
            }
            if self.poll_start(Instant::now())? {
                return Ok(());
            }
            if self.state.is_idle() {
                return Err(CaptureError::StartCancelled);
            }
            thread::sleep(self.config.start_poll_interval());
        }
    }

    /// Abandon a pending start. Returns whether there was one.
    pub fn cancel_start(&mut self) -> bool {
        if !self.state.is_starting() {
            return false;
        }
        if let Some(active) = &self.active {
            log::info!("Cancelled start of recording with '{}'", active.device_name);
        }
        self.release_device();
        self.set_state(RecorderState::Idle);
        true
    }

    /// Stop capturing. Does nothing when idle.
    pub fn stop_recording(&mut self) {
        if self.state.is_idle() {
            return;
        }
        if let Some(active) = &self.active {
            log::info!("Stopping recording with '{}'", active.device_name);
        }
        self.release_device();
        self.set_state(RecorderState::Idle);
    }

    // --- Per-frame update ---

    /// Per-frame update; `elapsed` is the time since the previous frame.
    pub fn tick(&mut self, elapsed: Duration) {
        self.tick_at(Instant::now(), elapsed);
    }

    pub fn tick_at(&mut self, now: Instant, elapsed: Duration) {
        self.diagnostics.ticks += 1;

        if self.state.is_starting() {
            // Errors are already reported; samples flow from the next tick on.
            let _ = self.poll_start(now);
            return;
        }
        if !self.state.is_recording() {
            return;
        }

        let Some((clip, offset)) = self.active.as_ref().map(|a| {
            let position = self.device.position(&a.device_name);
            (a.clip, read_offset(position, a.clip_len, self.samples.len()))
        }) else {
            self.lose_buffer(CaptureError::BufferUnavailable);
            return;
        };

        if let Err(e) = self.device.read_clip(clip, &mut self.samples, offset) {
            self.lose_buffer(e);
            return;
        }

        let Some(range) = window::new_sample_range(self.samples.len(), self.sample_rate_hz, elapsed)
        else {
            return;
        };
        apply_amplification(&mut self.samples, range.clone(), self.amplify_multiplier);

        let published = range.len() as u64;
        let event = RecordingEvent::new(&self.samples, range, self.sample_rate_hz);
        for (_, listener) in &self.listeners {
            listener.on_recording_event(&event);
        }

        self.diagnostics.events_published += 1;
        self.diagnostics.samples_published += published;
    }

    // --- Internal helpers ---

    fn set_state(&mut self, new_state: RecorderState) {
        if self.state == new_state {
            return;
        }
        self.state = new_state;
        for (_, listener) in &self.listeners {
            listener.on_state_changed(&new_state);
        }
    }

    fn notify_error(&self, error: &CaptureError) {
        for (_, listener) in &self.listeners {
            listener.on_error(error);
        }
    }

    /// Log and report `error`, then hand it back for returning.
    fn fail(&self, error: CaptureError) -> CaptureError {
        log::error!("{}", error);
        self.notify_error(&error);
        error
    }

    fn lose_buffer(&mut self, error: CaptureError) {
        log::error!("Audio clip for microphone is unavailable: {}", error);
        self.diagnostics.buffer_losses += 1;
        self.stop_recording();
        self.notify_error(&error);
    }

    fn release_device(&mut self) {
        if let Some(active) = self.active.take() {
            self.device.end(&active.device_name);
        }
    }
}

impl<D: MicDevice> Drop for MicSampleRecorder<D> {
    fn drop(&mut self) {
        self.stop_recording();
    }
}

/// Clip offset to read from so that the newest sample lands at the end of a
/// buffer of `buffer_len` samples.
fn read_offset(position: usize, clip_len: usize, buffer_len: usize) -> usize {
    if clip_len == 0 {
        return 0;
    }
    (position + clip_len - buffer_len % clip_len) % clip_len
}
