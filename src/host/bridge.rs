//! Bridge between interleaved host callbacks and the planar processor
//!
//! Native audio callbacks deliver frame-major interleaved blocks; the
//! processor works on channel-major planar blocks. The bridge owns the
//! processor and both planar blocks and does per block what the browser
//! host does per processing event: shape the blocks to this block's audio,
//! copy in, process, copy out on success.

use crate::buffer::PlanarBuffer;
use crate::processor::Audio;

pub struct ProcessorBridge {
    audio: Audio,
    input: PlanarBuffer,
    output: PlanarBuffer,
    interleaved_out: Vec<f32>,
    output_channels: usize,
}

impl ProcessorBridge {
    pub fn new(output_channels: usize) -> Self {
        Self {
            audio: Audio::new(),
            input: PlanarBuffer::new(0, 0),
            output: PlanarBuffer::new(0, 0),
            interleaved_out: Vec::new(),
            output_channels,
        }
    }

    pub fn output_channels(&self) -> usize {
        self.output_channels
    }

    /// Run one interleaved block through the processor.
    ///
    /// `interleaved_in` carries `in_channels` channels; the frame count is
    /// derived from the block length, so callbacks of any size work without
    /// reallocation once sizes settle. Returns the processed block
    /// interleaved at the bridge's output channel count, or `None` when the
    /// processor reported failure.
    pub fn run_block(&mut self, interleaved_in: &[f32], in_channels: usize) -> Option<&[f32]> {
        if in_channels == 0 {
            return None;
        }
        let frames = interleaved_in.len() / in_channels;

        self.input.ensure_shape(in_channels, frames);
        self.input.copy_from_interleaved(interleaved_in);
        self.output.ensure_shape(self.output_channels, frames);

        if !self.audio.process(&self.input, &mut self.output) {
            return None;
        }

        self.interleaved_out.resize(frames * self.output_channels, 0.0);
        self.output.copy_to_interleaved(&mut self.interleaved_out);
        Some(&self.interleaved_out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stereo_block_passes_through() {
        let mut bridge = ProcessorBridge::new(2);
        let block = [0.1, -0.1, 0.2, -0.2, 0.3, -0.3];

        let out = bridge.run_block(&block, 2).expect("block should process");
        assert_eq!(out, &block);
    }

    #[test]
    fn test_mono_into_stereo_silences_second_channel() {
        let mut bridge = ProcessorBridge::new(2);
        let block = [0.5, 0.6, 0.7];

        let out = bridge.run_block(&block, 1).expect("block should process");
        assert_eq!(out, &[0.5, 0.0, 0.6, 0.0, 0.7, 0.0]);
    }

    #[test]
    fn test_varying_block_sizes() {
        let mut bridge = ProcessorBridge::new(1);

        let first = bridge.run_block(&[1.0, 2.0, 3.0, 4.0], 1).unwrap().to_vec();
        assert_eq!(first, vec![1.0, 2.0, 3.0, 4.0]);

        let second = bridge.run_block(&[5.0], 1).unwrap().to_vec();
        assert_eq!(second, vec![5.0]);
    }

    #[test]
    fn test_empty_block() {
        let mut bridge = ProcessorBridge::new(2);
        let out = bridge.run_block(&[], 2).expect("empty block is a no-op");
        assert!(out.is_empty());
    }
}
