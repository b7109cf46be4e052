//! Sample-level DSP primitives used by the graph nodes.
//!
//! These run inside the audio callback: no allocation after construction,
//! no locks, one call per sample.

mod curve;
mod delay_line;
mod ramp;
mod smoothing;

pub use curve::{equal_power_pair, ShapingCurve};
pub use delay_line::DelayLine;
pub use ramp::Ramp;
pub use smoothing::Smoothed;
