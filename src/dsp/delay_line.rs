//! Ring-buffer delay line with fractional, modulatable read position.

use alloc::vec;
use alloc::vec::Vec;

/// A single-channel delay line.
///
/// Holds up to `max_delay` samples of history. Each call to
/// [`process`](Self::process) writes one sample and reads one sample from
/// `delay` samples in the past, linearly interpolating between neighbours so
/// the delay can sweep smoothly.
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
    max_delay: f32,
}

impl DelayLine {
    /// Create a line able to delay by up to `max_delay` samples.
    pub fn new(max_delay: usize) -> Self {
        // +2: the read at max_delay needs the sample after it for interpolation
        let len = max_delay.max(1) + 2;
        Self {
            buffer: vec![0.0; len],
            write_pos: 0,
            max_delay: max_delay as f32,
        }
    }

    /// Create a line holding `seconds` of audio at `sample_rate`.
    pub fn with_duration(seconds: f32, sample_rate: u32) -> Self {
        Self::new((seconds * sample_rate as f32).round() as usize)
    }

    /// Longest delay this line supports, in samples.
    #[inline]
    pub fn max_delay(&self) -> f32 {
        self.max_delay
    }

    /// Write `input`, then read the sample `delay` samples back.
    ///
    /// `delay` is clamped to `[0, max_delay]`; a delay of zero returns `input`.
    #[inline]
    pub fn process(&mut self, input: f32, delay: f32) -> f32 {
        let len = self.buffer.len();
        self.buffer[self.write_pos] = input;

        let delay = delay.clamp(0.0, self.max_delay);
        let whole = delay.floor();
        let frac = delay - whole;
        let whole = whole as usize;

        let newer = (self.write_pos + len - whole) % len;
        let older = (newer + len - 1) % len;
        let out = self.buffer[newer] + frac * (self.buffer[older] - self.buffer[newer]);

        self.write_pos = (self.write_pos + 1) % len;
        out
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}
