//! Browser-facing surface of the module
//!
//! Compiled in under the `wasm` feature. The page-side host keeps addresses
//! into the module's linear memory: it asks [`WasmAudio`] for the input
//! block's address, writes planar f32 channel data through the module's
//! `HEAPF32` view, invokes `process`, and copies the output block back out
//! only when `process` returned `true`.

use wasm_bindgen::prelude::*;

use crate::buffer::PlanarBuffer;
use crate::processor::Audio;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("wasm-audio module initialized");
}

/// The processor plus the heap blocks the page reads and writes.
///
/// Owning the blocks on this side of the boundary means the page never
/// allocates module memory itself; it only writes and reads through the
/// addresses handed out here.
#[wasm_bindgen]
pub struct WasmAudio {
    audio: Audio,
    input: PlanarBuffer,
    output: PlanarBuffer,
}

#[wasm_bindgen]
impl WasmAudio {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmAudio {
        WasmAudio {
            audio: Audio::new(),
            input: PlanarBuffer::new(0, 0),
            output: PlanarBuffer::new(0, 0),
        }
    }

    /// Address of the input block, shaped to `channels` x `frames` of
    /// channel-major f32 samples.
    ///
    /// The address is stable across calls with the same total sample count;
    /// a size change moves it, so the page must refresh its view after every
    /// call rather than caching the first address.
    pub fn input_ptr(&mut self, channels: u32, frames: u32) -> *mut f32 {
        self.input.ensure_shape(channels as usize, frames as usize);
        self.input.as_mut_ptr()
    }

    /// Address of the output block, shaped to `channels` x `frames`.
    pub fn output_ptr(&mut self, channels: u32, frames: u32) -> *const f32 {
        self.output.ensure_shape(channels as usize, frames as usize);
        self.output.as_ptr()
    }

    /// Run the processor over the input block into the output block.
    ///
    /// The counts must match the preceding `input_ptr`/`output_ptr` calls.
    /// Returns `true` when the output block holds fresh audio; on `false`
    /// the page must not copy it out.
    pub fn process(
        &mut self,
        in_channels: u32,
        in_frames: u32,
        out_channels: u32,
        out_frames: u32,
    ) -> bool {
        self.input
            .ensure_shape(in_channels as usize, in_frames as usize);
        self.output
            .ensure_shape(out_channels as usize, out_frames as usize);
        self.audio.process(&self.input, &mut self.output)
    }
}

impl Default for WasmAudio {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heap_protocol_round_trip() {
        let mut node = WasmAudio::new();

        // The host writes planar data at the input address...
        let ptr = node.input_ptr(2, 4);
        let samples: Vec<f32> = (0..8).map(|i| i as f32).collect();
        unsafe {
            std::slice::from_raw_parts_mut(ptr, 8).copy_from_slice(&samples);
        }

        // ...processes, and reads the output address on success.
        assert!(node.process(2, 4, 2, 4));
        let out = unsafe { std::slice::from_raw_parts(node.output_ptr(2, 4), 8) };
        assert_eq!(out, samples.as_slice());
    }

    #[test]
    fn test_mismatched_frames_reports_failure() {
        let mut node = WasmAudio::new();
        node.input_ptr(2, 8);
        node.output_ptr(2, 4);
        assert!(!node.process(2, 8, 2, 4));
    }

    #[test]
    fn test_input_address_stable_for_same_size() {
        let mut node = WasmAudio::new();
        let a = node.input_ptr(2, 512);
        let b = node.input_ptr(2, 512);
        assert_eq!(a, b);
    }
}
