//! Resampling source node
//!
//! Consumes audio from a ring buffer at one sample rate and outputs
//! at the graph's sample rate. Bridges a media stream to the device rate.

use dasp_graph::{Buffer, Input};
use rtrb::Consumer;

use crate::node::{AudioNode, ProcessContext};

/// A source that reads from a ring buffer and resamples to the graph's sample rate
///
/// Uses linear interpolation; the karaoke path is already band-limited by
/// the media decoder, so nothing sharper is needed here.
pub struct ResamplingSource {
    consumer: Consumer<f32>,
    channels: usize,
    input_sample_rate: u32,

    /// Fractional position in the input stream
    position: f64,

    /// Two frames per channel for linear interpolation (up to 8 channels)
    prev_samples: [f32; 8],
    curr_samples: [f32; 8],

    /// Frames read so far, up to the two interpolation needs
    primed: u8,
}

impl ResamplingSource {
    /// Create a resampling source
    ///
    /// - `consumer`: Ring buffer consumer with interleaved samples at `input_sample_rate`
    /// - `channels`: Number of audio channels
    /// - `input_sample_rate`: Sample rate of the incoming audio
    pub fn new(consumer: Consumer<f32>, channels: usize, input_sample_rate: u32) -> Self {
        Self {
            consumer,
            channels: channels.clamp(1, 8),
            input_sample_rate,
            position: 0.0,
            prev_samples: [0.0; 8],
            curr_samples: [0.0; 8],
            primed: 0,
        }
    }

    /// Shift current to previous and read the next frame.
    ///
    /// Only whole frames are read; on underrun nothing moves.
    fn step_frame(&mut self) -> bool {
        if self.consumer.slots() < self.channels {
            return false;
        }
        self.prev_samples[..self.channels].copy_from_slice(&self.curr_samples[..self.channels]);
        for sample in self.curr_samples[..self.channels].iter_mut() {
            if let Ok(s) = self.consumer.pop() {
                *sample = s;
            }
        }
        true
    }
}

impl AudioNode for ResamplingSource {
    type Message = ();

    fn process(
        &mut self,
        ctx: &ProcessContext,
        _messages: impl Iterator<Item = ()>,
        _inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        if outputs.is_empty() {
            return;
        }

        let rate_ratio = self.input_sample_rate as f64 / ctx.sample_rate as f64;
        let buffer_len = outputs[0].len();

        // Prime the interpolator if needed
        while self.primed < 2 {
            if !self.step_frame() {
                crate::node::silence(outputs);
                return;
            }
            self.primed += 1;
        }

        for i in 0..buffer_len {
            while self.position >= 1.0 {
                if !self.step_frame() {
                    // Underrun: silence the rest, resume from the same frame
                    for buffer in outputs.iter_mut() {
                        buffer[i..].iter_mut().for_each(|s| *s = 0.0);
                    }
                    return;
                }
                self.position -= 1.0;
            }

            let t = self.position as f32;

            for (ch, buffer) in outputs.iter_mut().enumerate() {
                let ch_idx = ch % self.channels;
                let prev = self.prev_samples[ch_idx];
                let curr = self.curr_samples[ch_idx];
                buffer[i] = prev + t * (curr - prev);
            }

            self.position += rate_ratio;
        }
    }

    #[inline]
    fn num_inputs(&self) -> usize { 0 }

    #[inline]
    fn num_outputs(&self) -> usize { self.channels }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtrb::RingBuffer;

    #[test]
    fn upsampling_doubles_frame_count() {
        let (mut producer, consumer) = RingBuffer::<f32>::new(1024);
        for i in 0..200 {
            producer.push(i as f32).unwrap();
            producer.push(-(i as f32)).unwrap();
        }

        let mut source = ResamplingSource::new(consumer, 2, 24_000);
        let ctx = ProcessContext { sample_rate: 48_000, buffer_size: 64 };
        let mut outputs = [Buffer::SILENT, Buffer::SILENT];
        source.process(&ctx, core::iter::empty(), &[], &mut outputs);

        // Half a source frame per output sample
        assert_eq!(outputs[0][0], 0.0);
        assert!((outputs[0][1] - 0.5).abs() < 1e-6);
        assert!((outputs[0][2] - 1.0).abs() < 1e-6);
        assert!((outputs[1][2] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn underrun_resumes_without_losing_a_frame() {
        let (mut producer, consumer) = RingBuffer::<f32>::new(1024);
        for i in 0..10 {
            producer.push(i as f32).unwrap();
        }

        let mut source = ResamplingSource::new(consumer, 1, 48_000);
        let ctx = ProcessContext { sample_rate: 48_000, buffer_size: 64 };
        let mut outputs = [Buffer::SILENT];
        source.process(&ctx, core::iter::empty(), &[], &mut outputs);
        assert_eq!(outputs[0][8], 8.0);
        assert_eq!(outputs[0][9], 0.0);

        for i in 10..100 {
            producer.push(i as f32).unwrap();
        }
        source.process(&ctx, core::iter::empty(), &[], &mut outputs);
        let expected: Vec<f32> = (9..73).map(|i| i as f32).collect();
        assert_eq!(&outputs[0][..], &expected[..]);
    }
}
