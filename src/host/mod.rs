//! Native harness - a stand-in host that drives the processor
//!
//! This module provides:
//! - A bridge running interleaved blocks through the planar processor
//! - Live input capture looped through the processor
//! - Audio file playback run through the processor

mod bridge;
mod file;
mod live;
mod output;

pub use bridge::ProcessorBridge;
pub use file::{FileInfo, FilePlayback};
pub use live::LiveLoopback;

use thiserror::Error;

/// Errors from the harness's device and decode plumbing.
#[derive(Error, Debug)]
pub enum HostError {
    #[error("Failed to open file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to probe audio format: {0}")]
    Probe(String),

    #[error("No audio tracks found")]
    NoTracks,

    #[error("Decoder error: {0}")]
    Decoder(String),

    #[error("Selected input device not found")]
    DeviceNotFound,

    #[error("No output device available")]
    NoOutputDevice,

    #[error("Failed to enumerate devices: {0}")]
    Devices(#[from] cpal::DevicesError),

    #[error("Failed to query stream config: {0}")]
    StreamConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("Failed to build stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("Failed to start stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("Unsupported sample format: {0:?}")]
    UnsupportedFormat(cpal::SampleFormat),
}
