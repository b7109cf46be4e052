//! Sawtooth ramp oscillator.

/// A rising sawtooth: climbs linearly from -1.0 to +1.0 once per period,
/// then snaps back.
///
/// Used as a control-rate modulator. Phase is kept in cycles (`0.0..1.0`) so
/// two ramps can be run a fixed fraction of a period apart.
#[derive(Clone, Copy, Debug)]
pub struct Ramp {
    frequency: f32,
    phase: f32,
}

impl Ramp {
    pub fn new(frequency: f32) -> Self {
        Self {
            frequency: frequency.max(0.0),
            phase: 0.0,
        }
    }

    /// Start `phase` cycles into the period (0.5 = 180°).
    pub fn with_phase(mut self, phase: f32) -> Self {
        self.phase = phase.rem_euclid(1.0);
        self
    }

    /// Position within the period, `0.0..1.0`.
    #[inline]
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Bipolar sawtooth value, `-1.0..1.0`.
    #[inline]
    pub fn value(&self) -> f32 {
        2.0 * self.phase - 1.0
    }

    /// Move forward by one sample.
    #[inline]
    pub fn advance(&mut self, sample_rate: u32) {
        self.phase += self.frequency / sample_rate as f32;
        // Branchless phase wrap (phase is always positive)
        self.phase -= (self.phase >= 1.0) as u32 as f32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_period_spans_minus_one_to_one() {
        let mut ramp = Ramp::new(10.0);
        let mut min = f32::MAX;
        let mut max = f32::MIN;
        for _ in 0..100 {
            min = min.min(ramp.value());
            max = max.max(ramp.value());
            ramp.advance(1000);
        }
        assert_eq!(min, -1.0);
        assert!(max > 0.97 && max < 1.0);
        assert!(ramp.phase() < 1e-4 || ramp.phase() > 1.0 - 1e-4);
    }

    #[test]
    fn half_cycle_offset_stays_half_cycle_apart() {
        let mut a = Ramp::new(10.0);
        let mut b = Ramp::new(10.0).with_phase(0.5);
        for _ in 0..1234 {
            a.advance(48_000);
            b.advance(48_000);
            let gap = (b.phase() - a.phase()).rem_euclid(1.0);
            assert!((gap - 0.5).abs() < 1e-3, "gap {}", gap);
        }
    }
}
