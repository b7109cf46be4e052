//! Karaoke audio graph with message-passing parameter control
//!
//! A single media stream enters the graph once and is routed through two
//! parallel paths that end at the same destination:
//!
//! ```text
//!                      ┌─► dry gain ─────────────────────────────┐
//! media ─► [pitch] ────┤                                         ├─► destination
//!                      └─► L−R cancel ─► boost ─► wet gain ──────┘
//! ```
//!
//! - "Guide" mode: dry = 1, wet = 0 (original vocals audible)
//! - "Singing" mode: dry = 0, wet = 1 (center-panned vocals cancelled)
//!
//! Mode changes never jump; both gains approach their targets exponentially
//! inside the audio callback. The optional pitch stage is a dual delay-line
//! shifter whose modulation depth follows a semitone control.
//!
//! Design principles (inherited from the graph core):
//! - Each graph has a fixed sample rate (from device or explicit)
//! - Nodes receive parameters via message ring buffers, not shared state
//! - No Arc, no locks on the audio thread

extern crate alloc;

mod node;
mod graph;
mod engine;
mod destination;

pub mod config;
pub mod context;
pub mod controller;
pub mod coordinator;
pub mod dsp;
pub mod error;
pub mod key;
pub mod media;
pub mod nodes;

#[cfg(test)]
mod test_util;

pub use node::{AudioNode, ProcessContext, NodeId};
pub use engine::{Engine, Handle};
pub use destination::{Destination, RingDestination};
#[cfg(feature = "cpal_sink")]
pub use destination::CpalDevice;

pub use config::{CoordinatorConfig, CrossfadeConfig, EngineConfig, PitchConfig};
pub use context::{AudioContext, ContextState};
pub use controller::{AudioGraphController, CrossfadeTargets, Mode};
pub use coordinator::{MediaPlayer, Notifier, PlayOutcome, PlayTicket, PlaybackCoordinator, Song};
pub use error::{GraphError, MediaErrorCode, PlaybackError, ResolveError};
pub use key::KeyShift;
pub use media::{MediaElement, MediaFeed};
