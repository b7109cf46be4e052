//! Gain/volume control effect

use dasp_graph::{Buffer, Input};

use crate::dsp::Smoothed;
use crate::node::{AudioNode, ProcessContext};

/// Messages to control gain
#[derive(Clone, Copy, Debug)]
pub enum GainMessage {
    /// Jump to a gain multiplier (1.0 = unity, 0.0 = silence, -1.0 = inverted)
    SetGain(f32),
    /// Approach `target` exponentially with the given time constant in seconds
    SetTarget { target: f32, time_constant: f32 },
}

/// A gain (volume) control that passes audio through with amplitude scaling
///
/// Supports any number of channels - each input channel maps to corresponding output.
/// Level changes are applied per sample inside the callback, never as a step
/// at a block boundary, unless [`GainMessage::SetGain`] asks for a jump.
pub struct Gain {
    level: Smoothed,
    channels: usize,
}

impl Gain {
    /// Create a new stereo gain node with the specified gain value
    pub fn new(gain: f32) -> Self {
        Self {
            level: Smoothed::new(gain),
            channels: 2,
        }
    }

    /// Set the number of channels passed through
    pub fn with_channels(mut self, channels: usize) -> Self {
        self.channels = channels.max(1);
        self
    }

    /// Level currently applied
    #[inline]
    pub fn gain(&self) -> f32 {
        self.level.current()
    }

    /// Level being approached
    #[inline]
    pub fn target(&self) -> f32 {
        self.level.target()
    }
}

impl AudioNode for Gain {
    type Message = GainMessage;

    fn process(
        &mut self,
        ctx: &ProcessContext,
        messages: impl Iterator<Item = GainMessage>,
        inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        for msg in messages {
            match msg {
                GainMessage::SetGain(g) => self.level.set_immediate(g),
                GainMessage::SetTarget { target, time_constant } => {
                    self.level.set_target(target, time_constant, ctx.sample_rate)
                }
            }
        }

        if outputs.is_empty() {
            return;
        }

        let in_buffers = inputs.first().map(|input| input.buffers()).unwrap_or(&[]);

        if in_buffers.is_empty() {
            // No input buffers - output silence, but keep the ramp moving
            crate::node::silence(outputs);
            for _ in 0..ctx.buffer_size {
                self.level.next_sample();
            }
            return;
        }

        let buffer_len = outputs[0].len();
        let last = in_buffers.len() - 1;

        for i in 0..buffer_len {
            let gain = self.level.next_sample();
            for (ch, out_buffer) in outputs.iter_mut().enumerate() {
                // Get input for this channel, or last available channel
                out_buffer[i] = in_buffers[ch.min(last)][i] * gain;
            }
        }
    }

    #[inline]
    fn num_inputs(&self) -> usize { 1 }

    #[inline]
    fn num_outputs(&self) -> usize { self.channels }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{OfflineRig, Constant};

    #[test]
    fn jump_applies_immediately() {
        let mut rig = OfflineRig::new(1000);
        let src = rig.engine.add(Constant::stereo(1.0, 1.0));
        let mut gain = rig.engine.add(Gain::new(1.0));
        rig.engine.connect(&src, &gain).unwrap();
        rig.engine.output(&gain).unwrap();

        gain.send(GainMessage::SetGain(0.25)).unwrap();
        let (left, right) = rig.render_blocks(1);
        assert!(left.iter().all(|&s| s == 0.25));
        assert!(right.iter().all(|&s| s == 0.25));
    }

    #[test]
    fn target_is_approached_smoothly() {
        let mut rig = OfflineRig::new(1000);
        let src = rig.engine.add(Constant::stereo(1.0, 1.0));
        let mut gain = rig.engine.add(Gain::new(0.0));
        rig.engine.connect(&src, &gain).unwrap();
        rig.engine.output(&gain).unwrap();

        gain.send(GainMessage::SetTarget { target: 1.0, time_constant: 0.1 }).unwrap();
        let (left, _) = rig.render_blocks(1);

        // monotonic rise, nowhere near the target after 64ms at tau = 100ms
        for pair in left.windows(2) {
            assert!(pair[1] > pair[0]);
        }
        assert!(left[63] < 0.5);

        let (left, _) = rig.render_blocks(16);
        assert!((left[left.len() - 1] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn negative_gain_inverts() {
        let mut rig = OfflineRig::new(48_000);
        let src = rig.engine.add(Constant::stereo(0.5, -0.25));
        let gain = rig.engine.add(Gain::new(-1.0));
        rig.engine.connect(&src, &gain).unwrap();
        rig.engine.output(&gain).unwrap();

        let (left, right) = rig.render_blocks(1);
        assert!(left.iter().all(|&s| s == -0.5));
        assert!(right.iter().all(|&s| s == 0.25));
    }
}
