//! wasm-audio - pass-through audio processor for embeddable modules
//!
//! The [`Audio`] processor copies blocks of planar f32 audio from an input
//! buffer to an output buffer unchanged. That is the whole job: it exists so
//! a host can verify its wiring end to end (buffers allocated, channel data
//! copied in, `process` invoked, result copied out) before any real
//! processing is dropped in behind the same interface.
//!
//! Two hosts are provided:
//! - the `wasm` feature exposes the processor to a browser page over the
//!   module's linear memory
//! - the `harness` feature (default) is a native stand-in host that drives
//!   the processor from live capture or file playback

mod buffer;
mod processor;

pub use buffer::PlanarBuffer;
pub use processor::{Audio, ProcessError};

#[cfg(feature = "harness")]
pub mod host;
#[cfg(feature = "harness")]
pub mod settings;

#[cfg(feature = "wasm")]
pub mod wasm;
