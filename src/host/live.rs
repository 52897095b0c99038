//! Live loopback - capture, process, play back
//!
//! Captures audio from an input device, runs each callback block through
//! the processor, and plays the result on the default output device.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::{
    traits::{Producer, Split},
    HeapRb,
};

use super::bridge::ProcessorBridge;
use super::output::start_output_stream;
use super::HostError;
use crate::settings::Settings;

/// Ring capacity in frames; about one second at typical rates.
const RING_FRAMES: usize = 48000;

/// Live loopback engine: input device -> processor -> output device.
pub struct LiveLoopback {
    /// Whether the loopback is active
    is_running: Arc<AtomicBool>,

    input_stream: Option<cpal::Stream>,
    output_stream: Option<cpal::Stream>,

    /// Gain multiplier (shared atomically with the capture callback)
    gain_atomic: Arc<AtomicU32>,

    /// Gain applied to captured input
    pub gain: f32,

    /// Available input devices
    pub devices: Vec<String>,

    /// Selected device index
    pub selected_device: usize,

    output_channels: usize,
}

impl LiveLoopback {
    pub fn new(settings: &Settings) -> Self {
        // Enumerate input devices
        let host = cpal::default_host();
        let devices: Vec<String> = host
            .input_devices()
            .map(|devices| devices.filter_map(|d| d.name().ok()).collect())
            .unwrap_or_default();

        log::info!("Found {} input device(s)", devices.len());

        Self {
            is_running: Arc::new(AtomicBool::new(false)),
            input_stream: None,
            output_stream: None,
            gain_atomic: Arc::new(AtomicU32::new(settings.gain.to_bits())),
            gain: settings.gain,
            devices,
            selected_device: 0,
            output_channels: settings.output_channels,
        }
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Relaxed)
    }

    /// Start the loopback.
    pub fn start(&mut self) -> Result<(), HostError> {
        if self.input_stream.is_some() {
            return Ok(());
        }

        log::info!("Starting live loopback...");

        let host = cpal::default_host();
        let device = host
            .input_devices()?
            .nth(self.selected_device)
            .ok_or(HostError::DeviceNotFound)?;

        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());
        log::info!("Using input device: {}", device_name);

        let config = device.default_input_config()?;
        log::info!("Input config: {:?}", config);

        let in_channels = config.channels() as usize;

        let ring = HeapRb::<f32>::new(RING_FRAMES * self.output_channels);
        let (mut producer, consumer) = ring.split();

        // Sync current gain to the atomic before the callback starts
        self.gain_atomic.store(self.gain.to_bits(), Ordering::Relaxed);
        let gain_atomic = Arc::clone(&self.gain_atomic);
        let is_running = Arc::clone(&self.is_running);
        let mut bridge = ProcessorBridge::new(self.output_channels);
        let mut scratch: Vec<f32> = Vec::new();

        let input_stream = match config.sample_format() {
            cpal::SampleFormat::F32 => device.build_input_stream(
                &config.into(),
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if !is_running.load(Ordering::Relaxed) {
                        return;
                    }

                    let gain = f32::from_bits(gain_atomic.load(Ordering::Relaxed));
                    scratch.clear();
                    scratch.extend(data.iter().map(|s| s * gain));

                    if let Some(block) = bridge.run_block(&scratch, in_channels) {
                        for &sample in block {
                            let _ = producer.try_push(sample);
                        }
                    }
                },
                |err| log::error!("Audio input error: {}", err),
                None,
            )?,
            cpal::SampleFormat::I16 => device.build_input_stream(
                &config.into(),
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    if !is_running.load(Ordering::Relaxed) {
                        return;
                    }

                    let gain = f32::from_bits(gain_atomic.load(Ordering::Relaxed));
                    scratch.clear();
                    scratch.extend(data.iter().map(|&s| (s as f32 / 32768.0) * gain));

                    if let Some(block) = bridge.run_block(&scratch, in_channels) {
                        for &sample in block {
                            let _ = producer.try_push(sample);
                        }
                    }
                },
                |err| log::error!("Audio input error: {}", err),
                None,
            )?,
            format => return Err(HostError::UnsupportedFormat(format)),
        };

        self.output_stream = Some(start_output_stream(consumer, self.output_channels)?);
        input_stream.play()?;

        self.is_running.store(true, Ordering::Relaxed);
        self.input_stream = Some(input_stream);
        log::info!("Loopback running on {}", device_name);
        Ok(())
    }

    /// Stop the loopback and release both streams.
    pub fn stop(&mut self) {
        self.is_running.store(false, Ordering::Relaxed);
        drop(self.input_stream.take());
        drop(self.output_stream.take());
        log::info!("Loopback stopped");
    }

    /// Sync the gain value to the capture callback.
    pub fn sync_gain(&self) {
        self.gain_atomic.store(self.gain.to_bits(), Ordering::Relaxed);
    }
}
