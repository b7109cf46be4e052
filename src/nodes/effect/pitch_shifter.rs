//! Dual delay-line pitch shifter
//!
//! Reading from a delay line whose delay changes over time resamples the
//! signal: a shrinking delay plays the past back faster (higher pitch), a
//! growing delay plays it slower (lower pitch). A delay cannot shrink or grow
//! forever, so it is swept by a sawtooth ramp and snaps back once per period.
//!
//! The snap would click, so two lines run half a period apart. A triangle
//! control derived from the first ramp drives a pair of equal-power lookup
//! curves: each line is fully faded out at the moment its own ramp wraps,
//! while the other line is at full level.
//!
//! ```text
//!            ┌─► delay 1 (ramp 1) ─► × fade_out(tri) ─┐
//! input ─────┤                                        ├─► output
//!            └─► delay 2 (ramp 2) ─► × fade_in(tri)  ─┘
//! ```
//!
//! The ramps never stop or restart; only their depth (`speed`) changes.
//!
//! With no shift both lines read the same sample, and equal-power weights
//! would sum to up to √2. While the taps are within a millisecond of each
//! other the sum is normalised by the weights instead, so an unshifted
//! signal passes at unity gain.

use dasp_graph::{Buffer, Input};

use crate::config::PitchConfig;
use crate::dsp::{equal_power_pair, DelayLine, Ramp, ShapingCurve, Smoothed};
use crate::node::{AudioNode, ProcessContext};

/// Messages to control the pitch shifter
#[derive(Clone, Copy, Debug)]
pub enum PitchShifterMessage {
    /// Pitch offset in `-1.0..=1.0`. Negative raises pitch, positive lowers it;
    /// `-1.0` is an octave up.
    SetPitchOffset(f32),
}

/// Number of delay lines (and ramps)
const LINES: usize = 2;
/// The shifter works on stereo audio
const CHANNELS: usize = 2;
/// Tap separation, in seconds, below which both lines carry the same signal
const COINCIDENT_SPAN: f32 = 0.001;

/// A delay-line pitch shifter with continuously adjustable offset.
pub struct PitchShifter {
    /// `lines[line][channel]`
    lines: [[DelayLine; CHANNELS]; LINES],
    ramps: [Ramp; LINES],
    fade_out: ShapingCurve,
    fade_in: ShapingCurve,
    /// Peak-to-peak delay sweep per ramp period, in seconds
    speed: Smoothed,
    offset: f32,
    config: PitchConfig,
}

impl PitchShifter {
    /// Build a shifter for a graph running at `sample_rate`.
    ///
    /// Allocates the delay lines and computes both crossfade curves once; the
    /// ramps start immediately, 180° apart, at zero depth.
    pub fn new(config: PitchConfig, sample_rate: u32) -> Self {
        let max_delay = config.base_delay * 2.0;
        let line = || DelayLine::with_duration(max_delay, sample_rate);
        let ramp = Ramp::new(1.0 / config.buffer_time);
        let (fade_out, fade_in) = equal_power_pair(config.curve_len);

        Self {
            lines: [[line(), line()], [line(), line()]],
            ramps: [ramp, ramp.with_phase(0.5)],
            fade_out,
            fade_in,
            speed: Smoothed::new(0.0),
            offset: 0.0,
            config,
        }
    }

    /// Current pitch offset
    #[inline]
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Modulation depth being approached, `offset × buffer_time`
    #[inline]
    pub fn speed_target(&self) -> f32 {
        self.speed.target()
    }

    /// Phase of each ramp, in cycles
    pub fn ramp_phases(&self) -> [f32; LINES] {
        [self.ramps[0].phase(), self.ramps[1].phase()]
    }

    /// The crossfade curves, `(fade_out, fade_in)`
    pub fn curves(&self) -> (&ShapingCurve, &ShapingCurve) {
        (&self.fade_out, &self.fade_in)
    }

    fn set_pitch_offset(&mut self, offset: f32, sample_rate: u32) {
        let offset = if offset.is_finite() { offset.clamp(-1.0, 1.0) } else { 0.0 };
        self.offset = offset;
        self.speed
            .set_target(offset * self.config.buffer_time, self.config.smoothing, sample_rate);
    }
}

impl AudioNode for PitchShifter {
    type Message = PitchShifterMessage;

    fn process(
        &mut self,
        ctx: &ProcessContext,
        messages: impl Iterator<Item = PitchShifterMessage>,
        inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        for msg in messages {
            match msg {
                PitchShifterMessage::SetPitchOffset(offset) => {
                    self.set_pitch_offset(offset, ctx.sample_rate)
                }
            }
        }

        if outputs.is_empty() {
            return;
        }

        let in_buffers = inputs.first().map(|input| input.buffers()).unwrap_or(&[]);
        let last_in = in_buffers.len().saturating_sub(1);
        let rate = ctx.sample_rate as f32;
        let base = self.config.base_delay * rate;
        let coincident = COINCIDENT_SPAN * rate;
        let buffer_len = outputs[0].len();

        for i in 0..buffer_len {
            let half_sweep = 0.5 * self.speed.next_sample();

            // 1.0 where ramp 1 wraps, -1.0 where ramp 2 wraps
            let control = 2.0 * self.ramps[0].value().abs() - 1.0;
            let gains = [self.fade_out.shape(control), self.fade_in.shape(control)];
            let delays = [
                base + half_sweep * self.ramps[0].value() * rate,
                base + half_sweep * self.ramps[1].value() * rate,
            ];
            // 1.0 when the taps coincide, fading to 0.0 one span apart
            let overlap = (1.0 - (delays[0] - delays[1]).abs() / coincident).max(0.0);
            let norm = 1.0 + overlap * (1.0 / (gains[0] + gains[1]) - 1.0);

            for ch in 0..CHANNELS {
                let input = if in_buffers.is_empty() { 0.0 } else { in_buffers[ch.min(last_in)][i] };
                let mut mixed = 0.0;
                for line in 0..LINES {
                    mixed += self.lines[line][ch].process(input, delays[line]) * gains[line];
                }
                if let Some(out) = outputs.get_mut(ch) {
                    out[i] = mixed * norm;
                }
            }

            for ramp in self.ramps.iter_mut() {
                ramp.advance(ctx.sample_rate);
            }
        }
    }

    #[inline]
    fn num_inputs(&self) -> usize { 1 }

    #[inline]
    fn num_outputs(&self) -> usize { CHANNELS }
}
