//! Mixer effect - sums multiple inputs together

use dasp_graph::{Buffer, Input};
use crate::node::{AudioNode, ProcessContext};

/// A mixer that sums multiple inputs together
///
/// Plays the role of the graph's destination: the dry and wet paths both
/// land here. Each input is summed with equal weight into `channels`
/// outputs. Mono inputs are copied to every output; extra input channels
/// are ignored.
pub struct Mixer {
    channels: usize,
}

impl Mixer {
    /// Create a new mixer with the specified number of output channels
    pub fn new(channels: usize) -> Self {
        Self { channels: channels.max(1) }
    }

    /// Create a stereo mixer
    pub fn stereo() -> Self {
        Self::new(2)
    }
}

impl AudioNode for Mixer {
    type Message = ();

    fn process(
        &mut self,
        _ctx: &ProcessContext,
        _messages: impl Iterator<Item = Self::Message>,
        inputs: &[Input],
        output: &mut [Buffer],
    ) {
        crate::node::silence(output);

        for input in inputs {
            let in_buffers = input.buffers();
            if in_buffers.is_empty() {
                continue;
            }
            let last = in_buffers.len() - 1;

            for (out_ch, out_buf) in output.iter_mut().enumerate() {
                let in_buf = &in_buffers[out_ch.min(last)];
                for (out_sample, in_sample) in out_buf.iter_mut().zip(in_buf.iter()) {
                    *out_sample += *in_sample;
                }
            }
        }
    }

    fn num_inputs(&self) -> usize {
        // Accept any number of inputs
        usize::MAX
    }

    fn num_outputs(&self) -> usize {
        self.channels
    }
}
