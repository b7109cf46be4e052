//! Center-channel cancellation (vocal suppression)

use dasp_graph::{Buffer, Input};
use crate::node::{AudioNode, ProcessContext};

/// Removes center-panned content by subtracting the right channel from the left.
///
/// Equivalent to splitting the stereo input, inverting the right channel and
/// merging `L + (−R)` into both output channels. Lead vocals are usually mixed
/// dead center, so they cancel; anything panned off-center survives.
///
/// The difference signal is quieter than the original mix, so the wet path
/// follows this node with a boost [`Gain`](super::Gain).
pub struct CenterCancel;

impl CenterCancel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CenterCancel {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioNode for CenterCancel {
    type Message = ();

    fn process(
        &mut self,
        _ctx: &ProcessContext,
        _messages: impl Iterator<Item = ()>,
        inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        let in_buffers = inputs.first().map(|input| input.buffers()).unwrap_or(&[]);

        // Mono or missing input has no side signal
        if in_buffers.len() < 2 {
            crate::node::silence(outputs);
            return;
        }

        let (left, right) = (&in_buffers[0], &in_buffers[1]);
        let Some((first, rest)) = outputs.split_first_mut() else {
            return;
        };

        for ((out, l), r) in first.iter_mut().zip(left.iter()).zip(right.iter()) {
            *out = *l - *r;
        }

        for buffer in rest.iter_mut() {
            buffer.copy_from_slice(first);
        }
    }

    #[inline]
    fn num_inputs(&self) -> usize { 1 }

    #[inline]
    fn num_outputs(&self) -> usize { 2 }
}
