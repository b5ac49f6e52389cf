use std::ops::Range;
use std::sync::Arc;
use std::time::{Duration, Instant};

use approx::assert_relative_eq;
use parking_lot::Mutex;

use mic_capture_core::{
    CancelToken, CaptureError, DeviceCaps, LevelMeter, MicProfile, MicSampleRecorder,
    RecorderConfig, RecorderState, RecordingEvent, RecordingListener, SimulatedMicDevice,
    DEFAULT_SAMPLE_RATE_HZ,
};

const MIC: &str = "USB Mic";
const RATE: u32 = 8000;

#[derive(Default)]
struct ListenerLog {
    ranges: Mutex<Vec<Range<usize>>>,
    windows: Mutex<Vec<Vec<f32>>>,
    states: Mutex<Vec<RecorderState>>,
    errors: Mutex<Vec<CaptureError>>,
}

impl RecordingListener for ListenerLog {
    fn on_recording_event(&self, event: &RecordingEvent<'_>) {
        self.ranges.lock().push(event.range());
        self.windows.lock().push(event.new_samples().to_vec());
    }

    fn on_state_changed(&self, state: &RecorderState) {
        self.states.lock().push(*state);
    }

    fn on_error(&self, error: &CaptureError) {
        self.errors.lock().push(error.clone());
    }
}

fn device() -> SimulatedMicDevice {
    SimulatedMicDevice::new()
        .with_device(MIC, DeviceCaps::new(4000, RATE))
        .with_device("Headset", DeviceCaps::new(0, 0))
}

fn recording(profile: MicProfile) -> (MicSampleRecorder<SimulatedMicDevice>, Arc<ListenerLog>) {
    let mut recorder = MicSampleRecorder::with_default_config(device());
    let seen = Arc::new(ListenerLog::default());
    recorder.subscribe(seen.clone());
    recorder.set_profile(Some(profile));
    recorder.start_recording().unwrap();
    recorder.device_mut().advance_silence(MIC, 1);
    assert_eq!(recorder.poll_start(Instant::now()), Ok(true));
    (recorder, seen)
}

#[test]
fn event_range_has_estimated_length_and_ends_at_buffer_end() {
    let (mut recorder, seen) = recording(MicProfile::new(MIC));
    let len = recorder.samples().len();

    for micros in [16_667u64, 33_333, 8_333, 100_000] {
        recorder.tick(Duration::from_micros(micros));
    }

    let ranges = seen.ranges.lock();
    assert_eq!(ranges.len(), 4);
    for (range, micros) in ranges.iter().zip([16_667u64, 33_333, 8_333, 100_000]) {
        let expected = (f64::from(RATE) * micros as f64 / 1_000_000.0).round() as usize;
        assert_eq!(range.len(), expected);
        assert_eq!(range.end - 1, len - 1);
        assert!(range.start < range.end);
    }
}

#[test]
fn newest_device_samples_arrive_at_the_end_of_the_buffer() {
    let (mut recorder, seen) = recording(MicProfile::new(MIC));
    let ramp: Vec<f32> = (0..80).map(|i| i as f32 / 100.0).collect();
    recorder.device_mut().push_samples(MIC, &ramp);

    // 10 ms at 8 kHz = 80 samples
    recorder.tick(Duration::from_millis(10));

    let windows = seen.windows.lock();
    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0], ramp);
}

#[test]
fn amplification_clamps_new_samples_to_unit_range() {
    let (mut recorder, seen) = recording(MicProfile::new(MIC).with_amplification(18));
    let loud: Vec<f32> = (0..160).map(|i| if i % 2 == 0 { 0.5 } else { -0.3 }).collect();
    recorder.device_mut().push_samples(MIC, &loud);

    recorder.tick(Duration::from_millis(20));

    let windows = seen.windows.lock();
    assert!(windows[0].iter().all(|s| (-1.0..=1.0).contains(s)));
    assert_eq!(windows[0][0], 1.0);
    assert_eq!(windows[0][1], -1.0);
}

#[test]
fn zero_db_profile_leaves_samples_untouched() {
    let (mut recorder, seen) = recording(MicProfile::new(MIC));
    let quiet = vec![0.123_f32; 80];
    recorder.device_mut().push_samples(MIC, &quiet);

    recorder.tick(Duration::from_millis(10));

    let windows = seen.windows.lock();
    let bits: Vec<u32> = windows[0].iter().map(|s| s.to_bits()).collect();
    assert!(bits.iter().all(|&b| b == 0.123_f32.to_bits()));
}

#[test]
fn missing_device_keeps_recorder_idle_without_resizing() {
    let mut recorder = MicSampleRecorder::with_default_config(device());
    recorder.set_profile(Some(MicProfile::new(MIC)));
    assert_eq!(recorder.samples().len(), RATE as usize);

    recorder.device_mut().disconnect(MIC);
    let seen = Arc::new(ListenerLog::default());
    recorder.subscribe(seen.clone());

    let err = recorder.start_recording().unwrap_err();
    assert!(matches!(err, CaptureError::DeviceNotFound { ref name, .. } if name == MIC));
    assert!(!recorder.is_recording());
    assert!(recorder.state().is_idle());
    assert_eq!(recorder.samples().len(), RATE as usize);
    assert_eq!(recorder.device().start_calls(), 0);
    assert_eq!(seen.errors.lock().len(), 1);
}

#[test]
fn empty_or_missing_profile_never_starts_or_reallocates() {
    let mut recorder = MicSampleRecorder::with_default_config(device());

    recorder.set_profile(None);
    assert_eq!(recorder.samples().len(), DEFAULT_SAMPLE_RATE_HZ as usize);
    assert_eq!(recorder.sample_rate_hz(), DEFAULT_SAMPLE_RATE_HZ);

    recorder.set_profile(Some(MicProfile::new("")));
    assert_eq!(recorder.samples().len(), DEFAULT_SAMPLE_RATE_HZ as usize);
    assert!(!recorder.is_recording());
    assert_eq!(recorder.device().start_calls(), 0);

    assert_eq!(recorder.start_recording(), Err(CaptureError::NoProfile));
    assert_eq!(recorder.device().start_calls(), 0);
}

#[test]
fn whitespace_profile_name_is_a_device_name() {
    let mut recorder = MicSampleRecorder::with_default_config(
        SimulatedMicDevice::new().with_device(" ", DeviceCaps::new(4000, RATE)),
    );
    recorder.set_profile(Some(MicProfile::new(" ")));
    assert_eq!(recorder.samples().len(), RATE as usize);

    assert_eq!(recorder.start_recording(), Ok(()));
    assert_eq!(recorder.device().start_calls(), 1);
    recorder.device_mut().advance_silence(" ", 1);
    assert_eq!(recorder.poll_start(Instant::now()), Ok(true));
}

#[test]
fn any_frequency_device_uses_default_rate() {
    let mut recorder = MicSampleRecorder::with_default_config(device());
    recorder.set_profile(Some(MicProfile::new("Headset")));
    assert_eq!(recorder.sample_rate_hz(), DEFAULT_SAMPLE_RATE_HZ);
}

#[test]
fn stop_is_idempotent() {
    let (mut recorder, _seen) = recording(MicProfile::new(MIC));

    recorder.stop_recording();
    assert!(!recorder.is_recording());
    assert_eq!(recorder.device().end_calls(), 1);

    recorder.stop_recording();
    assert!(!recorder.is_recording());
    assert_eq!(recorder.device().end_calls(), 1);
}

#[test]
fn start_times_out_when_device_never_advances() {
    let mut recorder = MicSampleRecorder::with_default_config(device());
    recorder.device_mut().stall(MIC);
    recorder.set_profile(Some(MicProfile::new(MIC)));

    let t0 = Instant::now();
    recorder.start_recording_at(t0).unwrap();
    assert!(recorder.state().is_starting());

    assert_eq!(recorder.poll_start(t0 + Duration::from_millis(999)), Ok(false));

    let err = recorder
        .poll_start(t0 + Duration::from_millis(1001))
        .unwrap_err();
    assert_eq!(
        err,
        CaptureError::CaptureStartTimeout {
            name: MIC.into(),
            waited_ms: 1000
        }
    );
    assert!(recorder.state().is_idle());
    assert!(!recorder.device().is_capturing(MIC));
    assert_eq!(recorder.diagnostics().start_timeouts, 1);
}

#[test]
fn tick_drives_pending_start() {
    let mut recorder = MicSampleRecorder::with_default_config(device());
    let seen = Arc::new(ListenerLog::default());
    recorder.subscribe(seen.clone());
    recorder.set_profile(Some(MicProfile::new(MIC)));
    recorder.start_recording().unwrap();

    recorder.tick(Duration::from_millis(16));
    assert!(recorder.state().is_starting());

    recorder.device_mut().advance_silence(MIC, 128);
    recorder.tick(Duration::from_millis(16));
    assert!(recorder.is_recording());
    assert!(seen.ranges.lock().is_empty());

    recorder.tick(Duration::from_millis(16));
    assert_eq!(seen.ranges.lock().len(), 1);

    let states = seen.states.lock();
    assert!(states[0].is_starting());
    assert_eq!(states[1], RecorderState::Recording);
}

#[test]
fn blocking_start_honours_cancellation() {
    let mut recorder = MicSampleRecorder::with_default_config(device());
    recorder.device_mut().stall(MIC);
    recorder.set_profile(Some(MicProfile::new(MIC)));

    let cancel = CancelToken::new();
    cancel.cancel();

    assert_eq!(
        recorder.start_recording_blocking(&cancel),
        Err(CaptureError::StartCancelled)
    );
    assert!(recorder.state().is_idle());
    assert!(!recorder.device().is_capturing(MIC));
}

#[test]
fn blocking_start_times_out() {
    let config = RecorderConfig {
        start_timeout_ms: 20,
        start_poll_interval_ms: 2,
        ..Default::default()
    };
    let mut recorder = MicSampleRecorder::new(device(), config).unwrap();
    recorder.device_mut().stall(MIC);
    recorder.set_profile(Some(MicProfile::new(MIC)));

    let result = recorder.start_recording_blocking(&CancelToken::new());
    assert!(matches!(result, Err(CaptureError::CaptureStartTimeout { .. })));
    assert!(!recorder.is_recording());
}

#[test]
fn lost_buffer_stops_recording() {
    let (mut recorder, seen) = recording(MicProfile::new(MIC));
    recorder.device_mut().drop_clip(MIC);

    recorder.tick(Duration::from_millis(16));

    assert!(!recorder.is_recording());
    assert_eq!(seen.errors.lock().as_slice(), &[CaptureError::BufferUnavailable]);
    assert!(seen.ranges.lock().is_empty());
    assert_eq!(recorder.diagnostics().buffer_losses, 1);
}

#[test]
fn profile_change_restarts_active_capture() {
    let (mut recorder, _seen) = recording(MicProfile::new(MIC));

    recorder.set_profile(Some(MicProfile::new("Headset")));

    assert_eq!(recorder.device().start_calls(), 2);
    assert!(recorder.device().is_capturing("Headset"));
    assert!(!recorder.device().is_capturing(MIC));
    assert!(recorder.state().is_starting());
    assert_eq!(recorder.samples().len(), DEFAULT_SAMPLE_RATE_HZ as usize);
}

#[test]
fn clearing_profile_stops_without_restart() {
    let (mut recorder, _seen) = recording(MicProfile::new(MIC));

    recorder.set_profile(None);

    assert!(recorder.state().is_idle());
    assert_eq!(recorder.device().start_calls(), 1);
    assert_eq!(recorder.samples().len(), RATE as usize);
}

#[test]
fn level_meter_sees_each_window() {
    let (mut recorder, _seen) = recording(MicProfile::new(MIC));
    let meter = Arc::new(LevelMeter::new());
    recorder.subscribe(meter.clone());

    recorder.device_mut().push_samples(MIC, &[0.5; 80]);
    recorder.tick(Duration::from_millis(10));

    assert_eq!(meter.windows(), 1);
    assert_relative_eq!(meter.current().rms, 0.5, epsilon = 1e-6);
    assert_relative_eq!(meter.held_peak(), 0.5);
}

#[test]
fn every_listener_receives_the_same_event() {
    let (mut recorder, seen) = recording(MicProfile::new(MIC));
    let second = Arc::new(ListenerLog::default());
    recorder.subscribe(second.clone());

    recorder.tick(Duration::from_millis(5));

    assert_eq!(*seen.ranges.lock(), *second.ranges.lock());
    assert_eq!(recorder.diagnostics().events_published, 1);
    assert_eq!(recorder.diagnostics().samples_published, 40);
}
