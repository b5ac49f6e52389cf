//! cpal microphone device.
//!
//! Each started device gets a dedicated thread that owns the `cpal::Stream`
//! (streams are not `Send` on every platform). The stream callback downmixes
//! to mono and writes into a looping clip shared with the recorder.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{SampleFormat, SizedSample, StreamConfig};
use parking_lot::Mutex;

use mic_capture_core::models::device::{ClipHandle, DeviceCaps};
use mic_capture_core::models::error::CaptureError;
use mic_capture_core::processing::clip::{downmix_into, LoopClip};
use mic_capture_core::traits::mic_device::MicDevice;

use crate::device_enumerator::{select_input_config, DeviceEnumerator};

/// A running input stream and the clip it fills.
struct CaptureStream {
    handle: ClipHandle,
    clip: Arc<Mutex<LoopClip>>,
    failed: Arc<AtomicBool>,
    stop_tx: mpsc::Sender<()>,
    join_handle: Option<thread::JoinHandle<()>>,
}

impl CaptureStream {
    fn close(mut self) {
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.join();
        }
    }
}

/// [`MicDevice`] backed by the default cpal host (WASAPI, CoreAudio, ALSA).
pub struct CpalMicDevice {
    host: cpal::Host,
    streams: HashMap<String, CaptureStream>,
    next_handle: u64,
}

impl CpalMicDevice {
    pub fn new() -> Self {
        Self::with_host(cpal::default_host())
    }

    pub fn with_host(host: cpal::Host) -> Self {
        Self {
            host,
            streams: HashMap::new(),
            next_handle: 0,
        }
    }
}

impl Default for CpalMicDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl MicDevice for CpalMicDevice {
    fn device_names(&self) -> Vec<String> {
        DeviceEnumerator::new(&self.host)
            .list_input_names()
            .unwrap_or_else(|e| {
                log::warn!("Failed to enumerate mic devices: {}", e);
                Vec::new()
            })
    }

    fn device_caps(&self, name: &str) -> Result<DeviceCaps, CaptureError> {
        DeviceEnumerator::new(&self.host).caps(name)
    }

    fn start(
        &mut self,
        name: &str,
        looping: bool,
        length_secs: u32,
        sample_rate_hz: u32,
    ) -> Result<ClipHandle, CaptureError> {
        if let Some(previous) = self.streams.remove(name) {
            previous.close();
        }

        let clip_len = length_secs as usize * sample_rate_hz as usize;
        let clip = Arc::new(Mutex::new(LoopClip::new(clip_len, looping)));
        let failed = Arc::new(AtomicBool::new(false));
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let host_id = self.host.id();
        let device_name = name.to_string();
        let thread_clip = Arc::clone(&clip);
        let thread_failed = Arc::clone(&failed);

        let join_handle = thread::Builder::new()
            .name(format!("mic-capture-{}", name))
            .spawn(move || {
                let host = match cpal::host_from_id(host_id) {
                    Ok(host) => host,
                    Err(err) => {
                        let _ = ready_tx.send(Err(CaptureError::Backend(err.to_string())));
                        return;
                    }
                };
                let stream = match open_stream(
                    &host,
                    &device_name,
                    sample_rate_hz,
                    thread_clip,
                    thread_failed,
                ) {
                    Ok(stream) => stream,
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };

                if let Err(err) = stream.play() {
                    let _ = ready_tx.send(Err(CaptureError::Backend(err.to_string())));
                    return;
                }

                let _ = ready_tx.send(Ok(()));
                let _ = stop_rx.recv();
                drop(stream);
            })
            .map_err(|e| CaptureError::Backend(format!("failed to spawn mic thread: {}", e)))?;

        let ready = ready_rx
            .recv()
            .map_err(|e| CaptureError::Backend(e.to_string()))?;
        if let Err(err) = ready {
            let _ = join_handle.join();
            return Err(err);
        }

        self.next_handle += 1;
        let handle = ClipHandle(self.next_handle);
        self.streams.insert(
            name.to_string(),
            CaptureStream {
                handle,
                clip,
                failed,
                stop_tx,
                join_handle: Some(join_handle),
            },
        );
        Ok(handle)
    }

    fn position(&self, name: &str) -> usize {
        self.streams
            .get(name)
            .map(|s| s.clip.lock().position())
            .unwrap_or(0)
    }

    fn read_clip(
        &self,
        clip: ClipHandle,
        buffer: &mut [f32],
        offset: usize,
    ) -> Result<(), CaptureError> {
        let stream = self
            .streams
            .values()
            .find(|s| s.handle == clip)
            .ok_or(CaptureError::BufferUnavailable)?;
        if stream.failed.load(Ordering::SeqCst) {
            return Err(CaptureError::BufferUnavailable);
        }
        stream.clip.lock().read_into(buffer, offset);
        Ok(())
    }

    fn end(&mut self, name: &str) {
        if let Some(stream) = self.streams.remove(name) {
            stream.close();
        }
    }
}

impl Drop for CpalMicDevice {
    fn drop(&mut self) {
        for (_, stream) in self.streams.drain() {
            stream.close();
        }
    }
}

fn open_stream(
    host: &cpal::Host,
    name: &str,
    sample_rate_hz: u32,
    clip: Arc<Mutex<LoopClip>>,
    failed: Arc<AtomicBool>,
) -> Result<cpal::Stream, CaptureError> {
    let device = DeviceEnumerator::new(host).find_input(name)?;
    let ranges = device
        .supported_input_configs()
        .map_err(|e| CaptureError::DeviceQueryFailed(e.to_string()))?;
    let supported = select_input_config(ranges, sample_rate_hz)?;
    let sample_format = supported.sample_format();
    let config: StreamConfig = supported.config();

    log::debug!(
        "Opening mic '{}' at {} Hz, {} channel(s), {:?}",
        name,
        config.sample_rate.0,
        config.channels,
        sample_format
    );

    let stream = match sample_format {
        SampleFormat::F32 => build_stream::<f32, _>(&device, &config, clip, failed, |s| s),
        SampleFormat::I16 => {
            build_stream::<i16, _>(&device, &config, clip, failed, i16_to_f32)
        }
        SampleFormat::U16 => {
            build_stream::<u16, _>(&device, &config, clip, failed, u16_to_f32)
        }
        other => {
            return Err(CaptureError::Backend(format!(
                "unsupported sample format {:?}",
                other
            )))
        }
    };
    stream.map_err(|e| CaptureError::Backend(e.to_string()))
}

fn build_stream<T, F>(
    device: &cpal::Device,
    config: &StreamConfig,
    clip: Arc<Mutex<LoopClip>>,
    failed: Arc<AtomicBool>,
    convert: F,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample,
    F: Fn(T) -> f32 + Send + 'static,
{
    let mut writer = InputWriter::new(usize::from(config.channels), convert, clip);
    device.build_input_stream(
        config,
        move |data: &[T], _info: &cpal::InputCallbackInfo| writer.write(data),
        move |err| {
            log::error!("Mic input stream error: {}", err);
            failed.store(true, Ordering::SeqCst);
        },
        None,
    )
}

/// Audio-thread side of a capture stream.
///
/// Converted and downmixed samples go through scratch buffers owned by the
/// writer, so after the first callback no further allocation happens.
struct InputWriter<F> {
    channels: usize,
    convert: F,
    converted: Vec<f32>,
    mono: Vec<f32>,
    clip: Arc<Mutex<LoopClip>>,
}

impl<F> InputWriter<F> {
    fn new(channels: usize, convert: F, clip: Arc<Mutex<LoopClip>>) -> Self {
        Self {
            channels,
            convert,
            converted: Vec::new(),
            mono: Vec::new(),
            clip,
        }
    }

    fn write<T: Copy>(&mut self, data: &[T])
    where
        F: Fn(T) -> f32,
    {
        let convert = &self.convert;
        self.converted.clear();
        self.converted.extend(data.iter().map(|&s| convert(s)));
        downmix_into(&self.converted, self.channels, &mut self.mono);
        self.clip.lock().write(&self.mono);
    }
}

fn i16_to_f32(sample: i16) -> f32 {
    f32::from(sample) / 32768.0
}

fn u16_to_f32(sample: u16) -> f32 {
    (f32::from(sample) - 32768.0) / 32768.0
}
