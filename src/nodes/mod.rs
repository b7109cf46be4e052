//! Built-in audio nodes.
//!
//! Nodes are organized into three categories:
//!
//! ## Sources ([`source`])
//!
//! Generate audio with no audio inputs:
//! - [`MediaSource`] - The media element's audio, tapped once per context
//! - [`ResamplingSource`] - Read from ring buffer with sample rate conversion (internal use)
//!
//! ## Effects ([`effect`])
//!
//! Process audio (inputs → outputs):
//! - [`Gain`] - Level control with exponential smoothing toward a target
//! - [`Mixer`] - Sum multiple inputs together (the destination)
//! - [`CenterCancel`] - L−R on both channels, removing center-panned vocals
//! - [`PitchShifter`] - Dual delay-line pitch shifter
//!
//! ## Sinks ([`sink`])
//!
//! Consume audio with no audio outputs:
//! - [`CpalSink`] - Output to system audio device (requires `cpal_sink` feature)
//! - [`RtrbSink`] - Write to ring buffer (offline rendering, sub-graph bridges)
//!
//! # Message Types
//!
//! - [`GainMessage`] - Set or retarget a [`Gain`] level
//! - [`PitchShifterMessage`] - Change the [`PitchShifter`] offset
//!
//! Nodes without parameters (like [`Mixer`]) use `()` as their message type.

pub mod source;
pub mod effect;
pub mod sink;

// Re-export common types at the top level for convenience
pub use source::{MediaSource, ResamplingSource};
pub use effect::{CenterCancel, Gain, GainMessage, Mixer, PitchShifter, PitchShifterMessage};
pub use sink::RtrbSink;

#[cfg(feature = "cpal_sink")]
pub use sink::CpalSink;
