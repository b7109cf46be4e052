//! Exponential parameter smoothing.
//!
//! Moves a value toward its target by a fixed fraction every sample, so that
//! after one time constant about 63% of the distance is covered. This is the
//! same curve an automation timeline produces for "set target at time".

/// A parameter that approaches its target exponentially, one sample at a time.
#[derive(Clone, Copy, Debug)]
pub struct Smoothed {
    current: f32,
    target: f32,
    /// Per-sample retention (0.0 = instant, 1.0 = frozen)
    coeff: f32,
}

impl Smoothed {
    /// Start settled at `value`, with no smoothing.
    pub fn new(value: f32) -> Self {
        Self {
            current: value,
            target: value,
            coeff: 0.0,
        }
    }

    /// Retention coefficient for a time constant in seconds.
    #[inline]
    pub fn coefficient(time_constant: f32, sample_rate: u32) -> f32 {
        let samples = time_constant * sample_rate as f32;
        if samples <= 0.0 {
            0.0
        } else {
            (-1.0 / samples).exp()
        }
    }

    /// Retarget, reaching ~63% of the way after `time_constant` seconds.
    pub fn set_target(&mut self, target: f32, time_constant: f32, sample_rate: u32) {
        self.target = target;
        self.coeff = Self::coefficient(time_constant, sample_rate);
    }

    /// Jump straight to `value`.
    pub fn set_immediate(&mut self, value: f32) {
        self.current = value;
        self.target = value;
    }

    /// Advance one sample and return the new value.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        self.current = self.target + self.coeff * (self.current - self.target);
        self.current
    }

    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_time_constant_covers_about_63_percent() {
        let mut s = Smoothed::new(0.0);
        s.set_target(1.0, 0.1, 1000);
        for _ in 0..100 {
            s.next_sample();
        }
        assert!((s.current() - 0.632).abs() < 0.01, "got {}", s.current());
    }

    #[test]
    fn never_overshoots() {
        let mut s = Smoothed::new(1.0);
        s.set_target(0.0, 0.01, 48_000);
        let mut last = s.current();
        for _ in 0..48_000 {
            let v = s.next_sample();
            assert!(v <= last && v >= 0.0);
            last = v;
        }
        assert!(last < 1e-6);
    }

    #[test]
    fn zero_time_constant_jumps() {
        let mut s = Smoothed::new(0.0);
        s.set_target(0.5, 0.0, 48_000);
        assert_eq!(s.next_sample(), 0.5);
    }
}
