//! # Audio Capture Module
//!
//! Microphone capture for the practice loop, built on CPAL. Audio arrives
//! as fixed-size mono frames on a crossbeam channel; the detection worker
//! consumes them one at a time.
//!
//! ## Features
//! - Default input device selection with format filtering
//! - Fixed-size frame delivery for the pitch estimator
//! - Stop with a keep-open hint, so calibration and practice can share
//!   one stream

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SupportedStreamConfigRange;
use crossbeam_channel::Sender;

/// Samples per analysis frame.
///
/// 2048 samples at 44.1 kHz is ~46 ms of audio: enough lag room for the
/// low E of a guitar while keeping prompt feedback snappy.
pub const FRAME_SIZE: usize = 2048;

/// Target capture rate in Hz.
const TARGET_SAMPLE_RATE: u32 = 44100;

/// A running (or paused) capture stream.
///
/// Dropping the handle releases the device. [`CaptureHandle::stop`] takes
/// the keep-open hint from the session/calibration sharing contract:
/// pausing keeps the device warm for the flow that still needs it.
pub struct CaptureHandle {
    stream: Option<cpal::Stream>,
    sample_rate: u32,
}

impl CaptureHandle {
    /// Actual sample rate of the opened stream.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Stops capturing. With `keep_stream_open` the stream is only paused
    /// and can be resumed; without it the device is released.
    pub fn stop(&mut self, keep_stream_open: bool) {
        if keep_stream_open {
            if let Some(stream) = &self.stream {
                if let Err(e) = stream.pause() {
                    eprintln!("[CAPTURE] Error pausing stream: {}", e);
                }
            }
        } else if let Some(stream) = self.stream.take() {
            drop(stream);
            eprintln!("[CAPTURE] Stream released");
        }
    }

    /// Resumes a paused stream, if it is still open.
    pub fn resume(&self) -> Result<()> {
        match &self.stream {
            Some(stream) => Ok(stream.play()?),
            None => Err(anyhow!("capture stream was already released")),
        }
    }
}

/// Starts capture from the default input device.
///
/// Accumulates callback data and forwards complete [`FRAME_SIZE`] frames
/// over `sender`; frames are dropped when the channel is full rather than
/// blocking the audio callback.
///
/// # Returns
/// * `Ok(handle)` - Running capture stream and its sample rate
/// * `Err(e)` - No usable device or configuration
pub fn start_capture(sender: Sender<Vec<f32>>) -> Result<CaptureHandle> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow!("No input device available"))?;

    eprintln!("[CAPTURE] Using audio input device: {}", device.name()?);

    let configs = device.supported_input_configs()?.collect::<Vec<_>>();
    let supported_config = find_supported_config(configs, TARGET_SAMPLE_RATE)
        .ok_or_else(|| anyhow!("No suitable f32 input format found"))?;

    let config = supported_config.with_sample_rate(cpal::SampleRate(TARGET_SAMPLE_RATE));
    let sample_rate = config.sample_rate().0;
    let config: cpal::StreamConfig = config.into();

    eprintln!("[CAPTURE] Selected sample rate: {} Hz", sample_rate);

    let err_fn = |err| eprintln!("[CAPTURE] Stream error: {}", err);

    // Accumulates callback data until a full frame is available.
    let mut frame_buffer = Vec::with_capacity(FRAME_SIZE * 2);

    let stream = device.build_input_stream(
        &config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            frame_buffer.extend_from_slice(data);
            while frame_buffer.len() >= FRAME_SIZE {
                let frame = frame_buffer[..FRAME_SIZE].to_vec();
                let _ = sender.try_send(frame);
                frame_buffer.drain(..FRAME_SIZE);
            }
        },
        err_fn,
        None,
    )?;

    stream.play()?;

    Ok(CaptureHandle { stream: Some(stream), sample_rate })
}

/// Picks the input configuration closest to the target rate among mono
/// f32 formats.
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs
        .into_iter()
        .filter(|c| c.channels() == 1 && c.sample_format() == cpal::SampleFormat::F32)
        .min_by_key(|c| {
            let min_diff = (c.min_sample_rate().0 as i32 - target_rate as i32).abs();
            let max_diff = (c.max_sample_rate().0 as i32 - target_rate as i32).abs();
            min_diff.min(max_diff)
        })
}
