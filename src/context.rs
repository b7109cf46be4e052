//! Audio context: an engine bound to a destination, with a run state.

use crate::config::EngineConfig;
use crate::destination::Destination;
use crate::engine::Engine;
use crate::error::GraphError;

/// Whether the context is rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContextState {
    /// Nothing is rendered and no parameter ramps advance
    Suspended,
    Running,
}

/// Owns the [`Engine`] for one session.
///
/// Many hosts keep audio suspended until a user gesture, so a context may
/// start out [`Suspended`](ContextState::Suspended) and only begin rendering
/// once [`resume`](Self::resume) is called.
pub struct AudioContext {
    engine: Engine,
    state: ContextState,
}

impl AudioContext {
    /// Create a context rendering into `destination`.
    pub fn new<D: Destination>(destination: &mut D, config: &EngineConfig) -> Result<Self, GraphError> {
        config.validate()?;
        let sink = destination.create_sink()?;
        let engine = Engine::with_queue_size(destination.sample_rate(), config.message_queue_size)
            .with_channels(config.channels)
            .with_output(sink);

        let state = if config.start_suspended {
            ContextState::Suspended
        } else {
            ContextState::Running
        };

        tracing::debug!(sample_rate = engine.sample_rate(), ?state, "audio context created");
        Ok(Self { engine, state })
    }

    #[inline]
    pub fn state(&self) -> ContextState {
        self.state
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.engine.sample_rate()
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    /// Start rendering. Returns `true` if the context was suspended.
    pub fn resume(&mut self) -> bool {
        let was_suspended = self.state == ContextState::Suspended;
        self.state = ContextState::Running;
        was_suspended
    }

    /// Stop rendering; parameter ramps hold where they are.
    pub fn suspend(&mut self) {
        self.state = ContextState::Suspended;
    }

    /// Render one block if running. Returns whether anything was rendered.
    pub fn process(&mut self) -> bool {
        match self.state {
            ContextState::Running => {
                self.engine.process();
                true
            }
            ContextState::Suspended => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::destination::RingDestination;

    #[test]
    fn suspended_context_renders_nothing_until_resumed() {
        let (mut dest, _rendered) = RingDestination::new(48_000, 1024);
        let mut ctx = AudioContext::new(&mut dest, &EngineConfig::default()).unwrap();
        assert_eq!(ctx.state(), ContextState::Suspended);
        assert!(!ctx.process());
        assert_eq!(ctx.engine().blocks_processed(), 0);

        assert!(ctx.resume());
        assert!(!ctx.resume());
        assert!(ctx.process());
        assert_eq!(ctx.engine().blocks_processed(), 1);

        ctx.suspend();
        assert_eq!(ctx.state(), ContextState::Suspended);
        assert!(!ctx.process());
        assert_eq!(ctx.engine().blocks_processed(), 1);
        assert!(ctx.resume());
    }

    #[test]
    fn context_takes_the_destination_rate() {
        let (mut dest, _rendered) = RingDestination::new(44_100, 1024);
        let config = EngineConfig::default().with_start_suspended(false);
        let ctx = AudioContext::new(&mut dest, &config).unwrap();
        assert_eq!(ctx.sample_rate(), 44_100);
        assert_eq!(ctx.state(), ContextState::Running);
    }

    #[test]
    fn invalid_config_is_rejected_before_the_sink_is_built() {
        let (mut dest, _rendered) = RingDestination::new(48_000, 1024);
        let config = EngineConfig {
            message_queue_size: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            AudioContext::new(&mut dest, &config),
            Err(GraphError::InvalidConfig(_))
        ));
        assert!(dest.create_sink().is_ok());
    }
}
