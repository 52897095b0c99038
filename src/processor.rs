//! The pass-through audio processor
//!
//! [`Audio`] is the unit a host embeds: construct it, hand it an input and
//! an output buffer per block, and check the boolean result. The body is a
//! straight copy so hosts can verify their wiring before real processing
//! replaces it behind the same interface.

use thiserror::Error;

use crate::buffer::PlanarBuffer;

/// Reasons `process` declines to produce output.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ProcessError {
    #[error("cannot copy {input} input frames into {output} output frames")]
    FrameMismatch { input: usize, output: usize },

    #[error("{side} buffer has no channels")]
    NoChannels { side: &'static str },
}

/// Pass-through audio processor.
#[derive(Debug, Default)]
pub struct Audio;

impl Audio {
    pub fn new() -> Self {
        Self
    }

    /// Copy `input` through to `output`.
    ///
    /// Returns `true` when output was produced. On `false` the output
    /// buffer is untouched and hosts must not read it; the reason is logged.
    pub fn process(&mut self, input: &PlanarBuffer, output: &mut PlanarBuffer) -> bool {
        match self.try_process(input, output) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("process failed: {}", e);
                false
            }
        }
    }

    /// [`process`](Self::process) with the failure reason.
    ///
    /// Channel `i` of the input is copied to channel `i` of the output for
    /// the channels both sides have; output channels past the input's count
    /// are silenced. A frame-count mismatch fails: a straight copy cannot
    /// bridge it without resampling, which this processor does not do.
    pub fn try_process(
        &mut self,
        input: &PlanarBuffer,
        output: &mut PlanarBuffer,
    ) -> Result<(), ProcessError> {
        if input.channels() == 0 {
            return Err(ProcessError::NoChannels { side: "input" });
        }
        if output.channels() == 0 {
            return Err(ProcessError::NoChannels { side: "output" });
        }
        if input.frames() != output.frames() {
            return Err(ProcessError::FrameMismatch {
                input: input.frames(),
                output: output.frames(),
            });
        }

        let shared = input.channels().min(output.channels());
        for ch in 0..shared {
            output.channel_mut(ch).copy_from_slice(input.channel(ch));
        }
        for ch in shared..output.channels() {
            output.channel_mut(ch).fill(0.0);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(channels: usize, frames: usize) -> PlanarBuffer {
        let mut buf = PlanarBuffer::new(channels, frames);
        for ch in 0..channels {
            for f in 0..frames {
                buf.channel_mut(ch)[f] = (ch * frames + f) as f32;
            }
        }
        buf
    }

    #[test]
    fn test_passthrough() {
        let mut audio = Audio::new();
        let input = ramp(2, 8);
        let mut output = PlanarBuffer::new(2, 8);

        assert!(audio.process(&input, &mut output));
        assert_eq!(output.as_slice(), input.as_slice());
    }

    #[test]
    fn test_extra_output_channels_are_silenced() {
        let mut audio = Audio::new();
        let input = ramp(1, 4);
        let mut output = PlanarBuffer::new(3, 4);
        output.as_mut_slice().fill(7.0);

        assert!(audio.process(&input, &mut output));
        assert_eq!(output.channel(0), input.channel(0));
        assert_eq!(output.channel(1), &[0.0; 4]);
        assert_eq!(output.channel(2), &[0.0; 4]);
    }

    #[test]
    fn test_fewer_output_channels() {
        let mut audio = Audio::new();
        let input = ramp(2, 4);
        let mut output = PlanarBuffer::new(1, 4);

        assert!(audio.process(&input, &mut output));
        assert_eq!(output.channel(0), input.channel(0));
    }

    #[test]
    fn test_frame_mismatch_leaves_output_untouched() {
        let mut audio = Audio::new();
        let input = ramp(2, 8);
        let mut output = PlanarBuffer::new(2, 4);
        output.as_mut_slice().fill(7.0);

        assert_eq!(
            audio.try_process(&input, &mut output),
            Err(ProcessError::FrameMismatch { input: 8, output: 4 })
        );
        assert!(!audio.process(&input, &mut output));
        assert!(output.as_slice().iter().all(|&s| s == 7.0));
    }

    #[test]
    fn test_no_channels_fails() {
        let mut audio = Audio::new();
        let input = PlanarBuffer::new(0, 0);
        let mut output = PlanarBuffer::new(2, 0);

        assert_eq!(
            audio.try_process(&input, &mut output),
            Err(ProcessError::NoChannels { side: "input" })
        );
    }

    #[test]
    fn test_zero_frames_is_a_valid_noop() {
        let mut audio = Audio::new();
        let input = PlanarBuffer::new(2, 0);
        let mut output = PlanarBuffer::new(2, 0);

        assert!(audio.process(&input, &mut output));
    }
}
