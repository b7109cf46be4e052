//! Ring buffer sink

use dasp_graph::{Buffer, Input};
use rtrb::Producer;

use crate::node::{AudioNode, ProcessContext};

/// A sink that pushes interleaved audio into an rtrb ring buffer
///
/// Used for:
/// - Offline rendering (tests, benchmarks)
/// - Bridging a sub-graph at another sample rate into the main graph
/// - Handing audio to a consumer on another thread
pub struct RtrbSink {
    producer: Producer<f32>,
    channels: usize,
    dropped_blocks: u64,
}

impl RtrbSink {
    /// Create a sink that writes interleaved samples to the given producer
    pub fn new(producer: Producer<f32>, channels: usize) -> Self {
        Self {
            producer,
            channels: channels.max(1),
            dropped_blocks: 0,
        }
    }

    /// Create a sink for stereo audio
    pub fn stereo(producer: Producer<f32>) -> Self {
        Self::new(producer, 2)
    }

    /// Returns how many sample slots are available
    #[inline]
    pub fn available(&self) -> usize {
        self.producer.slots()
    }
}

impl AudioNode for RtrbSink {
    type Message = (); // No control messages

    fn process(
        &mut self,
        _ctx: &ProcessContext,
        _messages: impl Iterator<Item = ()>,
        inputs: &[Input],
        _outputs: &mut [Buffer],
    ) {
        let Some(input) = inputs.first() else {
            return;
        };
        let buffers = input.buffers();

        if buffers.is_empty() {
            return;
        }

        let buffer_len = buffers[0].len();
        let samples_needed = buffer_len * self.channels;

        // Skip the whole block rather than write part of it
        if self.producer.slots() < samples_needed {
            self.dropped_blocks += 1;
            if self.dropped_blocks.is_power_of_two() {
                tracing::debug!(dropped = self.dropped_blocks, "ring consumer behind, dropping blocks");
            }
            return;
        }

        // Interleave channels
        for i in 0..buffer_len {
            for ch in 0..self.channels {
                let src_ch = ch.min(buffers.len() - 1);
                let _ = self.producer.push(buffers[src_ch][i]);
            }
        }
    }

    #[inline]
    fn num_inputs(&self) -> usize { 1 }

    #[inline]
    fn num_outputs(&self) -> usize { 0 }
}
