//! Core node trait and context types.

use dasp_graph::{Buffer, Input};

/// Information available during audio processing.
///
/// Passed to every [`AudioNode::process`] call. Contains the graph's sample rate
/// and the buffer size (always 64 samples, the `dasp_graph` block length).
#[derive(Clone, Copy, Debug)]
pub struct ProcessContext {
    /// Sample rate of the graph in Hz (e.g., 44100, 48000)
    pub sample_rate: u32,
    /// Number of samples per buffer (currently always 64)
    pub buffer_size: usize,
}

/// Unique identifier for a node within a graph.
///
/// You typically don't interact with this directly - use [`Handle`](crate::Handle) instead.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(pub(crate) u32);

/// The core trait for audio processing nodes.
///
/// Nodes can be:
/// - **Sources**: Generate audio (0 inputs, 1+ outputs) - the media tap, resamplers
/// - **Effects**: Process audio (1+ inputs, 1+ outputs) - gain, cancellation, pitch
/// - **Sinks**: Consume audio (1+ inputs, 0 outputs) - device outputs, ring buffers
///
/// # Message-Based Parameters
///
/// Instead of shared mutable state, nodes receive parameter updates via messages,
/// drained at the start of each block:
///
/// ```
/// use karaoke_graph::{AudioNode, ProcessContext};
/// use dasp_graph::{Buffer, Input};
///
/// enum TrimMessage {
///     SetLevel(f32),
/// }
///
/// struct Trim {
///     level: f32,
/// }
///
/// impl AudioNode for Trim {
///     type Message = TrimMessage;
///
///     fn process(
///         &mut self,
///         _ctx: &ProcessContext,
///         messages: impl Iterator<Item = TrimMessage>,
///         inputs: &[Input],
///         outputs: &mut [Buffer],
///     ) {
///         for msg in messages {
///             match msg {
///                 TrimMessage::SetLevel(l) => self.level = l,
///             }
///         }
///
///         let Some(input) = inputs.first() else { return };
///         for (out, inp) in outputs.iter_mut().zip(input.buffers()) {
///             for (o, i) in out.iter_mut().zip(inp.iter()) {
///                 *o = *i * self.level;
///             }
///         }
///     }
///
///     fn num_inputs(&self) -> usize { 1 }
///     fn num_outputs(&self) -> usize { 2 }
/// }
/// ```
pub trait AudioNode: Send + 'static {
    /// Message type for parameter updates (use `()` if none needed)
    type Message: Send + 'static;

    /// Process one block of audio
    ///
    /// 1. Drain and handle all pending messages
    /// 2. Read from inputs, write to outputs
    fn process(
        &mut self,
        ctx: &ProcessContext,
        messages: impl Iterator<Item = Self::Message>,
        inputs: &[Input],
        outputs: &mut [Buffer],
    );

    /// Number of input channels (0 for sources)
    fn num_inputs(&self) -> usize { 0 }

    /// Number of output channels
    fn num_outputs(&self) -> usize { 1 }

    /// Native sample rate of this node, if it has one
    ///
    /// Sources with fixed sample rates (e.g., a media stream) return `Some(rate)`.
    /// Effects and sinks that work at any rate return `None`.
    ///
    /// When adding a node with a native rate different from the graph's rate,
    /// the [`Engine`](crate::Engine) automatically creates a sub-graph with resampling.
    fn native_sample_rate(&self) -> Option<u32> { None }
}

/// Shared helper: silence every output buffer.
#[inline]
pub(crate) fn silence(outputs: &mut [Buffer]) {
    for buffer in outputs.iter_mut() {
        buffer.iter_mut().for_each(|s| *s = 0.0);
    }
}
