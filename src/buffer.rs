//! Planar f32 sample storage shared between the processor and its hosts
//!
//! Hosts hand audio around as one contiguous channel-major block: channel
//! `i` of an M-channel, N-frame buffer occupies floats `i*N..(i+1)*N`. The
//! browser host writes straight into this block through the module's linear
//! memory; the native harness converts from the interleaved layout its audio
//! callbacks use.

/// Owned channel-major sample storage.
#[derive(Debug, Clone)]
pub struct PlanarBuffer {
    data: Vec<f32>,
    channels: usize,
    frames: usize,
}

impl PlanarBuffer {
    /// Create a zeroed buffer of `channels` x `frames` samples.
    pub fn new(channels: usize, frames: usize) -> Self {
        Self {
            data: vec![0.0; channels * frames],
            channels,
            frames,
        }
    }

    /// Reshape to `channels` x `frames`, reallocating only when the total
    /// sample count changes.
    ///
    /// Contents are unspecified after a reshape; callers overwrite the
    /// buffer before reading it.
    pub fn ensure_shape(&mut self, channels: usize, frames: usize) {
        let len = channels * frames;
        if self.data.len() != len {
            self.data = vec![0.0; len];
        }
        self.channels = channels;
        self.frames = frames;
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Samples of one channel.
    pub fn channel(&self, index: usize) -> &[f32] {
        let start = index * self.frames;
        &self.data[start..start + self.frames]
    }

    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        let start = index * self.frames;
        &mut self.data[start..start + self.frames]
    }

    /// The whole block, channel-major.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn as_ptr(&self) -> *const f32 {
        self.data.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut f32 {
        self.data.as_mut_ptr()
    }

    pub fn silence(&mut self) {
        self.data.fill(0.0);
    }

    /// Deinterleave a frame-major block (as cpal callbacks deliver it) into
    /// this buffer. The source must carry `self.channels()` channels.
    ///
    /// Copies at most `self.frames()` frames and returns the number copied.
    /// When the source is short, the remaining tail of every channel is
    /// zeroed so a partial block cannot replay stale audio.
    pub fn copy_from_interleaved(&mut self, interleaved: &[f32]) -> usize {
        if self.channels == 0 {
            return 0;
        }
        let frames = (interleaved.len() / self.channels).min(self.frames);
        for (f, frame) in interleaved
            .chunks_exact(self.channels)
            .take(frames)
            .enumerate()
        {
            for (ch, &sample) in frame.iter().enumerate() {
                self.data[ch * self.frames + f] = sample;
            }
        }
        if frames < self.frames {
            for ch in 0..self.channels {
                let start = ch * self.frames;
                self.data[start + frames..start + self.frames].fill(0.0);
            }
        }
        frames
    }

    /// Interleave this buffer into a frame-major block. Copies as many whole
    /// frames as fit and returns the number copied.
    pub fn copy_to_interleaved(&self, interleaved: &mut [f32]) -> usize {
        if self.channels == 0 {
            return 0;
        }
        let frames = (interleaved.len() / self.channels).min(self.frames);
        for (f, frame) in interleaved
            .chunks_exact_mut(self.channels)
            .take(frames)
            .enumerate()
        {
            for (ch, sample) in frame.iter_mut().enumerate() {
                *sample = self.data[ch * self.frames + f];
            }
        }
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_layout() {
        let mut buf = PlanarBuffer::new(2, 4);
        buf.channel_mut(0).copy_from_slice(&[1.0, 2.0, 3.0, 4.0]);
        buf.channel_mut(1).copy_from_slice(&[5.0, 6.0, 7.0, 8.0]);

        // Channel 1 sits directly after channel 0 in the block
        assert_eq!(buf.as_slice(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_ensure_shape_keeps_allocation() {
        let mut buf = PlanarBuffer::new(2, 512);
        let ptr = buf.as_ptr();

        // Same total sample count, different split: no reallocation
        buf.ensure_shape(1, 1024);
        assert_eq!(buf.as_ptr(), ptr);
        assert_eq!(buf.channels(), 1);
        assert_eq!(buf.frames(), 1024);

        // Different total: reallocates
        buf.ensure_shape(2, 1024);
        assert_eq!(buf.len(), 2048);
    }

    #[test]
    fn test_interleaved_conversion() {
        let mut buf = PlanarBuffer::new(2, 3);
        let copied = buf.copy_from_interleaved(&[1.0, 10.0, 2.0, 20.0, 3.0, 30.0]);
        assert_eq!(copied, 3);
        assert_eq!(buf.channel(0), &[1.0, 2.0, 3.0]);
        assert_eq!(buf.channel(1), &[10.0, 20.0, 30.0]);

        let mut out = [0.0; 6];
        assert_eq!(buf.copy_to_interleaved(&mut out), 3);
        assert_eq!(out, [1.0, 10.0, 2.0, 20.0, 3.0, 30.0]);
    }

    #[test]
    fn test_short_block_zeroes_tail() {
        let mut buf = PlanarBuffer::new(2, 4);
        buf.as_mut_slice().fill(9.0);

        let copied = buf.copy_from_interleaved(&[1.0, 2.0]);
        assert_eq!(copied, 1);
        assert_eq!(buf.channel(0), &[1.0, 0.0, 0.0, 0.0]);
        assert_eq!(buf.channel(1), &[2.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_zero_channels() {
        let mut buf = PlanarBuffer::new(0, 0);
        assert!(buf.is_empty());
        assert_eq!(buf.copy_from_interleaved(&[1.0, 2.0]), 0);
    }
}
