//! Audio file playback through the processor
//!
//! Decodes a file with symphonia on a worker thread, chunks the decoded
//! audio into fixed-size blocks, runs each block through the processor,
//! and feeds the result to the output device.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use ringbuf::{
    traits::{Observer, Producer, Split},
    HeapRb,
};
use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, SeekMode, SeekTo};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::{Time, TimeBase};

use super::bridge::ProcessorBridge;
use super::output::start_output_stream;
use super::HostError;
use crate::settings::Settings;

/// Ring capacity in frames; about one second at typical rates.
const RING_FRAMES: usize = 48000;

/// What the probe learned about a file.
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub sample_rate: u32,
    pub channels: u32,
    pub duration: Duration,
}

/// File playback engine: decode -> processor -> output device.
pub struct FilePlayback {
    pub info: FileInfo,
    is_running: Arc<AtomicBool>,
    thread_handle: Option<thread::JoinHandle<()>>,
    output_stream: Option<cpal::Stream>,
}

impl FilePlayback {
    /// Start playing `path` through the processor.
    pub fn play(path: impl AsRef<Path>, settings: &Settings) -> Result<Self, HostError> {
        let path: PathBuf = path.as_ref().to_path_buf();

        let info = probe_info(&path)?;
        log::info!(
            "Playing {}: {} Hz, {} channel(s), {:?}",
            path.display(),
            info.sample_rate,
            info.channels,
            info.duration
        );

        let ring = HeapRb::<f32>::new(RING_FRAMES * settings.output_channels);
        let (producer, consumer) = ring.split();
        let output_stream = start_output_stream(consumer, settings.output_channels)?;

        let is_running = Arc::new(AtomicBool::new(true));
        let thread_is_running = Arc::clone(&is_running);
        let bridge = ProcessorBridge::new(settings.output_channels);
        let frame_count = settings.frame_count;
        let loop_playback = settings.loop_playback;

        let thread_handle = thread::spawn(move || {
            if let Err(e) = decode_loop(
                &path,
                producer,
                bridge,
                &thread_is_running,
                frame_count,
                loop_playback,
            ) {
                log::error!("Playback error: {}", e);
            }
            thread_is_running.store(false, Ordering::Relaxed);
        });

        Ok(Self {
            info,
            is_running,
            thread_handle: Some(thread_handle),
            output_stream: Some(output_stream),
        })
    }

    /// False once the file has finished and its tail has drained.
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Relaxed)
    }

    /// Stop playback and join the decode thread.
    pub fn stop(&mut self) {
        self.is_running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
        drop(self.output_stream.take());
    }
}

impl Drop for FilePlayback {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Probe a file for its basic parameters without decoding it.
fn probe_info(path: &Path) -> Result<FileInfo, HostError> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| HostError::Probe(e.to_string()))?;

    let track = probed
        .format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(HostError::NoTracks)?;

    let codec_params = &track.codec_params;
    let sample_rate = codec_params.sample_rate.unwrap_or(44100);
    let channels = codec_params.channels.map(|c| c.count() as u32).unwrap_or(2);

    let duration = if let Some(n_frames) = codec_params.n_frames {
        let time_base = codec_params
            .time_base
            .unwrap_or(TimeBase::new(1, sample_rate));
        let time = time_base.calc_time(n_frames);
        Duration::from_secs_f64(time.seconds as f64 + time.frac)
    } else {
        Duration::ZERO
    };

    Ok(FileInfo {
        sample_rate,
        channels,
        duration,
    })
}

/// Decode the file and push processed blocks into the output ring.
fn decode_loop(
    path: &Path,
    mut producer: ringbuf::HeapProd<f32>,
    mut bridge: ProcessorBridge,
    is_running: &AtomicBool,
    frame_count: usize,
    loop_playback: bool,
) -> Result<(), HostError> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| HostError::Probe(e.to_string()))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(HostError::NoTracks)?;
    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| HostError::Decoder(e.to_string()))?;

    // Decoded interleaved samples not yet chunked into blocks
    let mut pending: Vec<f32> = Vec::new();
    let mut channels = 0usize;
    let packet_sleep = Duration::from_millis(5);

    loop {
        if !is_running.load(Ordering::Relaxed) {
            return Ok(());
        }

        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                if loop_playback {
                    let _ = format.seek(
                        SeekMode::Accurate,
                        SeekTo::Time {
                            time: Time::from(0.0),
                            track_id: Some(track_id),
                        },
                    );
                    continue;
                }
                break;
            }
            Err(_) => break,
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let decoded_channels = append_interleaved(&decoded, &mut pending);
                if decoded_channels > 0 {
                    channels = decoded_channels;
                }
            }
            Err(_) => continue,
        }

        if channels == 0 {
            pending.clear();
            continue;
        }

        // Run whole blocks through the processor
        let block_len = frame_count * channels;
        while pending.len() >= block_len {
            // Wait for ring space so decoding doesn't run ahead of
            // real time; the output callback drives actual timing
            while producer.vacant_len() < frame_count * bridge.output_channels() {
                if !is_running.load(Ordering::Relaxed) {
                    return Ok(());
                }
                thread::sleep(packet_sleep);
            }

            if let Some(block) = bridge.run_block(&pending[..block_len], channels) {
                for &sample in block {
                    let _ = producer.try_push(sample);
                }
            }
            pending.drain(..block_len);
        }
    }

    // Flush the final partial block
    if channels > 0 && !pending.is_empty() {
        if let Some(block) = bridge.run_block(&pending, channels) {
            for &sample in block {
                let _ = producer.try_push(sample);
            }
        }
    }

    // Let the queued tail play out before reporting completion
    while is_running.load(Ordering::Relaxed) && producer.occupied_len() > 0 {
        thread::sleep(Duration::from_millis(10));
    }

    Ok(())
}

/// Append a decoded buffer to `pending` as interleaved f32 frames.
///
/// Returns the decoded channel count, or 0 for sample formats the harness
/// doesn't handle.
fn append_interleaved(buffer: &AudioBufferRef<'_>, pending: &mut Vec<f32>) -> usize {
    match buffer {
        AudioBufferRef::F32(buf) => {
            let channels = buf.spec().channels.count();
            for frame in 0..buf.frames() {
                for ch in 0..channels {
                    pending.push(buf.chan(ch)[frame]);
                }
            }
            channels
        }
        AudioBufferRef::S16(buf) => {
            let channels = buf.spec().channels.count();
            for frame in 0..buf.frames() {
                for ch in 0..channels {
                    pending.push(buf.chan(ch)[frame] as f32 / 32768.0);
                }
            }
            channels
        }
        AudioBufferRef::S32(buf) => {
            let channels = buf.spec().channels.count();
            for frame in 0..buf.frames() {
                for ch in 0..channels {
                    pending.push(buf.chan(ch)[frame] as f32 / 2147483648.0);
                }
            }
            channels
        }
        _ => 0,
    }
}
