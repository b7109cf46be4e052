//! Offline rendering helpers for unit tests.

use dasp_graph::{Buffer, Input};
use rtrb::{Consumer, RingBuffer};

use crate::engine::Engine;
use crate::node::{AudioNode, ProcessContext};
use crate::nodes::RtrbSink;

/// Emits a fixed value on each channel.
pub(crate) struct Constant {
    left: f32,
    right: f32,
}

impl Constant {
    pub fn stereo(left: f32, right: f32) -> Self {
        Self { left, right }
    }
}

impl AudioNode for Constant {
    type Message = ();

    fn process(
        &mut self,
        _ctx: &ProcessContext,
        _messages: impl Iterator<Item = ()>,
        _inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        for (ch, buffer) in outputs.iter_mut().enumerate() {
            let v = if ch == 0 { self.left } else { self.right };
            buffer.iter_mut().for_each(|s| *s = v);
        }
    }

    fn num_outputs(&self) -> usize { 2 }
}

/// A unit-amplitude sine on both channels.
pub(crate) struct SineSource {
    frequency: f32,
    phase: f32,
}

impl SineSource {
    pub fn new(frequency: f32) -> Self {
        Self { frequency, phase: 0.0 }
    }
}

impl AudioNode for SineSource {
    type Message = ();

    fn process(
        &mut self,
        ctx: &ProcessContext,
        _messages: impl Iterator<Item = ()>,
        _inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        let inc = self.frequency / ctx.sample_rate as f32;
        for i in 0..Buffer::LEN {
            let v = (self.phase * core::f32::consts::TAU).sin();
            for buffer in outputs.iter_mut() {
                buffer[i] = v;
            }
            self.phase = (self.phase + inc).fract();
        }
    }

    fn num_outputs(&self) -> usize { 2 }
}

/// Sign changes in `samples`.
pub(crate) fn zero_crossings(samples: &[f32]) -> usize {
    samples
        .windows(2)
        .filter(|w| (w[0] < 0.0) != (w[1] < 0.0))
        .count()
}

/// An engine rendering into a ring buffer that the test drains.
pub(crate) struct OfflineRig {
    pub engine: Engine,
    consumer: Consumer<f32>,
}

impl OfflineRig {
    pub fn new(sample_rate: u32) -> Self {
        let (producer, consumer) = RingBuffer::<f32>::new(Buffer::LEN * 2 * 8);
        let engine = Engine::new(sample_rate).with_output(RtrbSink::stereo(producer));
        Self { engine, consumer }
    }

    /// Process `blocks` blocks, returning the de-interleaved output.
    pub fn render_blocks(&mut self, blocks: usize) -> (Vec<f32>, Vec<f32>) {
        let mut left = Vec::with_capacity(blocks * Buffer::LEN);
        let mut right = Vec::with_capacity(blocks * Buffer::LEN);
        for _ in 0..blocks {
            self.engine.process();
            while self.consumer.slots() >= 2 {
                left.push(self.consumer.pop().unwrap());
                right.push(self.consumer.pop().unwrap());
            }
        }
        (left, right)
    }
}
