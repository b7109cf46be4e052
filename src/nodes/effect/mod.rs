//! Audio effect nodes (processors with audio inputs and outputs)

mod center_cancel;
mod gain;
mod mixer;
mod pitch_shifter;

pub use center_cancel::CenterCancel;
pub use gain::{Gain, GainMessage};
pub use mixer::Mixer;
pub use pitch_shifter::{PitchShifter, PitchShifterMessage};
