//! In-process microphone for tests and headless runs.
//!
//! Samples are fed by the caller instead of an audio thread, which makes the
//! device cursor fully deterministic.

use std::collections::{HashMap, HashSet};

use crate::models::device::{ClipHandle, DeviceCaps};
use crate::models::error::CaptureError;
use crate::processing::clip::LoopClip;
use crate::traits::mic_device::MicDevice;

struct ActiveClip {
    handle: ClipHandle,
    clip: Option<LoopClip>,
}

/// A [`MicDevice`] whose clips are filled by [`push_samples`](Self::push_samples).
#[derive(Default)]
pub struct SimulatedMicDevice {
    devices: Vec<(String, DeviceCaps)>,
    active: HashMap<String, ActiveClip>,
    stalled: HashSet<String>,
    next_handle: u64,
    start_calls: u64,
    end_calls: u64,
}

impl SimulatedMicDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connected device.
    pub fn with_device(mut self, name: impl Into<String>, caps: DeviceCaps) -> Self {
        self.connect(name, caps);
        self
    }

    pub fn connect(&mut self, name: impl Into<String>, caps: DeviceCaps) {
        let name = name.into();
        self.devices.retain(|(n, _)| n != &name);
        self.devices.push((name, caps));
    }

    /// Unplug a device. An active capture keeps its handle but loses its clip.
    pub fn disconnect(&mut self, name: &str) {
        self.devices.retain(|(n, _)| n != name);
        self.drop_clip(name);
    }

    /// Make `name` ignore pushed samples, so its cursor never leaves 0.
    pub fn stall(&mut self, name: impl Into<String>) {
        self.stalled.insert(name.into());
    }

    /// Write captured samples into the clip of an active device.
    pub fn push_samples(&mut self, name: &str, samples: &[f32]) {
        if self.stalled.contains(name) {
            return;
        }
        if let Some(clip) = self.active.get_mut(name).and_then(|a| a.clip.as_mut()) {
            clip.write(samples);
        }
    }

    pub fn advance_silence(&mut self, name: &str, count: usize) {
        self.push_samples(name, &vec![0.0; count]);
    }

    /// Discard the clip of an active device, as if the OS released it.
    pub fn drop_clip(&mut self, name: &str) {
        if let Some(active) = self.active.get_mut(name) {
            active.clip = None;
        }
    }

    pub fn is_capturing(&self, name: &str) -> bool {
        self.active.contains_key(name)
    }

    pub fn start_calls(&self) -> u64 {
        self.start_calls
    }

    pub fn end_calls(&self) -> u64 {
        self.end_calls
    }
}

impl MicDevice for SimulatedMicDevice {
    fn device_names(&self) -> Vec<String> {
        self.devices.iter().map(|(n, _)| n.clone()).collect()
    }

    fn device_caps(&self, name: &str) -> Result<DeviceCaps, CaptureError> {
        self.devices
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, caps)| *caps)
            .ok_or_else(|| CaptureError::DeviceQueryFailed(format!("unknown device '{}'", name)))
    }

    fn start(
        &mut self,
        name: &str,
        looping: bool,
        length_secs: u32,
        sample_rate_hz: u32,
    ) -> Result<ClipHandle, CaptureError> {
        if !self.devices.iter().any(|(n, _)| n == name) {
            return Err(CaptureError::DeviceNotFound {
                name: name.to_string(),
                available: self.device_names().join(","),
            });
        }
        self.start_calls += 1;
        self.next_handle += 1;
        let handle = ClipHandle(self.next_handle);
        let length = length_secs as usize * sample_rate_hz as usize;
        self.active.insert(
            name.to_string(),
            ActiveClip {
                handle,
                clip: Some(LoopClip::new(length, looping)),
            },
        );
        Ok(handle)
    }

    fn position(&self, name: &str) -> usize {
        self.active
            .get(name)
            .and_then(|a| a.clip.as_ref())
            .map(LoopClip::position)
            .unwrap_or(0)
    }

    fn read_clip(
        &self,
        clip: ClipHandle,
        buffer: &mut [f32],
        offset: usize,
    ) -> Result<(), CaptureError> {
        let clip = self
            .active
            .values()
            .find(|a| a.handle == clip)
            .and_then(|a| a.clip.as_ref())
            .ok_or(CaptureError::BufferUnavailable)?;
        clip.read_into(buffer, offset);
        Ok(())
    }

    fn end(&mut self, name: &str) {
        if self.active.remove(name).is_some() {
            self.end_calls += 1;
        }
    }
}
