//! Lookup-curve wave shaping.

use alloc::vec::Vec;
use core::f32::consts::FRAC_PI_2;

/// A non-linear transfer function stored as a precomputed table.
///
/// Inputs in `-1.0..=1.0` map across the whole table (−1 → first point,
/// +1 → last point), with linear interpolation between points. Inputs
/// outside that range are clamped to the end points.
#[derive(Clone, Debug)]
pub struct ShapingCurve {
    table: Vec<f32>,
}

impl ShapingCurve {
    /// Tabulate `f` over `0.0..=1.0` at `len` points.
    pub fn from_fn(len: usize, f: impl Fn(f32) -> f32) -> Self {
        let len = len.max(2);
        let last = (len - 1) as f32;
        let table = (0..len).map(|i| f(i as f32 / last)).collect();
        Self { table }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn points(&self) -> &[f32] {
        &self.table
    }

    /// Shape a bipolar input.
    #[inline]
    pub fn shape(&self, input: f32) -> f32 {
        self.lookup((input.clamp(-1.0, 1.0) + 1.0) * 0.5)
    }

    /// Read the curve at a unipolar position `0.0..=1.0`.
    #[inline]
    pub fn lookup(&self, position: f32) -> f32 {
        let last = self.table.len() - 1;
        let v = position.clamp(0.0, 1.0) * last as f32;
        let i = (v as usize).min(last - 1);
        let frac = v - i as f32;
        self.table[i] + frac * (self.table[i + 1] - self.table[i])
    }
}

/// Complementary equal-power crossfade curves over one ramp period.
///
/// Returns `(fade_out, fade_in)` with `fade_out = cos(πx/2)` and
/// `fade_in = sin(πx/2)`, so `fade_out² + fade_in² = 1` at every point.
pub fn equal_power_pair(len: usize) -> (ShapingCurve, ShapingCurve) {
    (
        ShapingCurve::from_fn(len, |x| (x * FRAC_PI_2).cos()),
        ShapingCurve::from_fn(len, |x| (x * FRAC_PI_2).sin()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_power_points_sum_to_unity_power() {
        let (fade_out, fade_in) = equal_power_pair(4096);
        assert_eq!(fade_out.len(), 4096);
        for (a, b) in fade_out.points().iter().zip(fade_in.points()) {
            assert!((a * a + b * b - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn curves_meet_their_end_points() {
        let (fade_out, fade_in) = equal_power_pair(4096);
        assert_eq!(fade_out.shape(-1.0), 1.0);
        assert!(fade_out.shape(1.0).abs() < 1e-6);
        assert_eq!(fade_in.shape(-1.0), 0.0);
        assert!((fade_in.shape(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn shape_interpolates_and_clamps() {
        let ramp = ShapingCurve::from_fn(3, |x| x);
        assert!((ramp.shape(-0.5) - 0.25).abs() < 1e-6);
        assert_eq!(ramp.shape(-4.0), 0.0);
        assert_eq!(ramp.shape(4.0), 1.0);
    }
}
