//! Engine, crossfade and pitch stage configuration.

use core::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::GraphError;

/// Crossfade between the dry and wet paths.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CrossfadeConfig {
    /// Time constant of the exponential approach, in seconds
    pub time_constant: f32,
    /// Make-up gain applied to the L−R signal
    pub boost: f32,
}

impl Default for CrossfadeConfig {
    fn default() -> Self {
        Self {
            time_constant: 0.1,
            boost: 1.5,
        }
    }
}

/// Delay-line pitch shifter settings.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PitchConfig {
    /// Whether the pitch stage is inserted upstream of the dry/wet split
    pub enabled: bool,
    /// Nominal delay of both lines, in seconds. Each line holds twice this.
    pub base_delay: f32,
    /// Period of the modulating ramps, in seconds
    pub buffer_time: f32,
    /// Time constant for modulation depth changes, in seconds
    pub smoothing: f32,
    /// Number of points in each crossfade lookup curve
    pub curve_len: usize,
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_delay: 0.100,
            buffer_time: 0.100,
            smoothing: 0.010,
            curve_len: 4096,
        }
    }
}

/// Top-level configuration for an [`AudioContext`](crate::AudioContext).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EngineConfig {
    /// Output channels (the karaoke graph is stereo)
    pub channels: usize,
    /// Per-node parameter queue depth
    pub message_queue_size: usize,
    /// New contexts start suspended until resumed by a playback start
    pub start_suspended: bool,
    pub crossfade: CrossfadeConfig,
    pub pitch: PitchConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            channels: 2,
            message_queue_size: 64,
            start_suspended: true,
            crossfade: CrossfadeConfig::default(),
            pitch: PitchConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Build the variant without a pitch stage.
    pub fn without_pitch(mut self) -> Self {
        self.pitch.enabled = false;
        self
    }

    pub fn with_start_suspended(mut self, suspended: bool) -> Self {
        self.start_suspended = suspended;
        self
    }

    pub fn validate(&self) -> Result<(), GraphError> {
        if self.channels != 2 {
            return Err(GraphError::InvalidConfig(format!(
                "channels {} unsupported, the karaoke graph is stereo",
                self.channels
            )));
        }
        if self.message_queue_size == 0 {
            return Err(GraphError::InvalidConfig("message_queue_size must be > 0".into()));
        }
        if !(self.crossfade.time_constant > 0.0) {
            return Err(GraphError::InvalidConfig(format!(
                "crossfade time constant {} must be positive",
                self.crossfade.time_constant
            )));
        }
        let pitch = &self.pitch;
        if !(pitch.base_delay > 0.0) || !(pitch.buffer_time > 0.0) || !(pitch.smoothing > 0.0) {
            return Err(GraphError::InvalidConfig(
                "pitch delays and time constants must be positive".into(),
            ));
        }
        // The ramp sweeps buffer_time seconds peak-to-peak at full offset,
        // centred on base_delay; it must stay within [0, 2 * base_delay]
        if pitch.buffer_time > 2.0 * pitch.base_delay {
            return Err(GraphError::InvalidConfig(format!(
                "buffer_time {} exceeds twice base_delay {}",
                pitch.buffer_time, pitch.base_delay
            )));
        }
        if pitch.curve_len < 2 {
            return Err(GraphError::InvalidConfig("curve_len must be at least 2".into()));
        }
        Ok(())
    }
}

/// Playback coordinator settings.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CoordinatorConfig {
    /// Delay before auto-advancing after a failed start
    pub retry_delay: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            retry_delay: Duration::from_secs(3),
        }
    }
}
