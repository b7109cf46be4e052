//! Media element audio tap

use dasp_graph::{Buffer, Input};
use rtrb::Consumer;

use crate::node::{AudioNode, ProcessContext};

/// The point where the media element's audio enters the graph.
///
/// Reads interleaved samples that the media element's decoder pushes into a
/// ring buffer and always emits stereo: a mono stream is copied to both
/// channels. On underrun the rest of the block is silent.
///
/// The node reports the stream's native rate, so the [`Engine`](crate::Engine)
/// resamples it when the output device runs at a different rate.
///
/// Created by [`MediaElement::tap`](crate::MediaElement::tap); one per element.
pub struct MediaSource {
    consumer: Consumer<f32>,
    channels: usize,
    sample_rate: u32,
    frame: [f32; 2],
    underruns: u64,
}

impl MediaSource {
    pub(crate) fn new(consumer: Consumer<f32>, channels: usize, sample_rate: u32) -> Self {
        Self {
            consumer,
            channels: channels.clamp(1, 2),
            sample_rate,
            frame: [0.0; 2],
            underruns: 0,
        }
    }

    /// Channels in the incoming stream (1 or 2)
    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Blocks that ran out of media samples
    #[inline]
    pub fn underruns(&self) -> u64 {
        self.underruns
    }

    /// Read one frame (all channels) from the ring buffer
    fn read_frame(&mut self) -> bool {
        if self.consumer.slots() < self.channels {
            return false;
        }
        for ch in 0..self.channels {
            match self.consumer.pop() {
                Ok(sample) => self.frame[ch] = sample,
                Err(_) => return false,
            }
        }
        if self.channels == 1 {
            self.frame[1] = self.frame[0];
        }
        true
    }
}

impl AudioNode for MediaSource {
    type Message = ();

    fn process(
        &mut self,
        _ctx: &ProcessContext,
        _messages: impl Iterator<Item = ()>,
        _inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        if outputs.is_empty() {
            return;
        }

        let buffer_len = outputs[0].len();

        for i in 0..buffer_len {
            if !self.read_frame() {
                self.underruns += 1;
                for buffer in outputs.iter_mut() {
                    buffer[i..].iter_mut().for_each(|s| *s = 0.0);
                }
                return;
            }

            for (ch, buffer) in outputs.iter_mut().enumerate() {
                buffer[i] = self.frame[ch.min(1)];
            }
        }
    }

    #[inline]
    fn num_inputs(&self) -> usize { 0 }

    #[inline]
    fn num_outputs(&self) -> usize { 2 }

    fn native_sample_rate(&self) -> Option<u32> {
        Some(self.sample_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtrb::RingBuffer;

    #[test]
    fn mono_is_copied_to_both_channels() {
        let (mut producer, consumer) = RingBuffer::<f32>::new(256);
        for i in 0..64 {
            producer.push(i as f32).unwrap();
        }
        let mut source = MediaSource::new(consumer, 1, 44_100);
        let ctx = ProcessContext { sample_rate: 44_100, buffer_size: 64 };
        let mut outputs = [Buffer::SILENT, Buffer::SILENT];
        source.process(&ctx, core::iter::empty(), &[], &mut outputs);
        assert_eq!(outputs[0][5], 5.0);
        assert_eq!(outputs[1][5], 5.0);
        assert_eq!(source.underruns(), 0);
        assert_eq!(source.native_sample_rate(), Some(44_100));
    }

    #[test]
    fn short_block_is_padded_with_silence_and_counted() {
        let (mut producer, consumer) = RingBuffer::<f32>::new(256);
        // ten stereo frames and a dangling left sample
        for i in 0..21 {
            producer.push(1.0 + i as f32).unwrap();
        }
        let mut source = MediaSource::new(consumer, 2, 48_000);
        let ctx = ProcessContext { sample_rate: 48_000, buffer_size: 64 };
        let mut outputs = [Buffer::SILENT, Buffer::SILENT];
        source.process(&ctx, core::iter::empty(), &[], &mut outputs);

        assert_eq!(outputs[0][9], 19.0);
        assert_eq!(outputs[1][9], 20.0);
        assert!(outputs[0][10..].iter().all(|&s| s == 0.0));
        assert_eq!(source.underruns(), 1);

        source.process(&ctx, core::iter::empty(), &[], &mut outputs);
        assert_eq!(source.underruns(), 2);
    }
}
