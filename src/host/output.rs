//! Output side of the harness
//!
//! Plays processed audio from a lock-free ring so the decode or capture
//! side never shares a lock with the output callback.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::{traits::Consumer, HeapCons};

use super::HostError;

/// Build and start an output stream draining `cons`.
///
/// The ring carries interleaved audio at `channels` channels. Frames are
/// adapted to the device's channel count: extra device channels are
/// zero-filled, extra ring channels are dropped. An empty ring plays
/// silence.
pub(super) fn start_output_stream(
    mut cons: HeapCons<f32>,
    channels: usize,
) -> Result<cpal::Stream, HostError> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or(HostError::NoOutputDevice)?;

    let config = device.default_output_config()?;
    let device_channels = config.channels() as usize;

    let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());
    log::info!(
        "Output device: {} ({} channel(s))",
        device_name,
        device_channels
    );

    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            for frame in data.chunks_mut(device_channels) {
                for (ch, slot) in frame.iter_mut().enumerate() {
                    *slot = if ch < channels {
                        cons.try_pop().unwrap_or(0.0)
                    } else {
                        0.0
                    };
                }
                // Keep frame alignment when the ring has more channels
                // than the device
                for _ in device_channels..channels {
                    let _ = cons.try_pop();
                }
            }
        },
        |err| log::error!("Audio output error: {}", err),
        None,
    )?;

    stream.play()?;
    Ok(stream)
}
