//! Builds the karaoke graph on demand and drives its crossfade and pitch.
//!
//! The graph is built at most once per controller, lazily, the first time
//! playback starts:
//!
//! ```text
//! Uninitialized ──initialize()──► Ready
//!       │
//!       └──── build fails ─────► Unavailable   (playback continues, no effects)
//! ```
//!
//! Mode and pitch may be set in any state. Before the graph exists they are
//! only recorded; once it is built the recorded values are applied with the
//! usual smoothing.

use crate::config::EngineConfig;
use crate::context::{AudioContext, ContextState};
use crate::destination::Destination;
use crate::engine::{Engine, Handle};
use crate::error::GraphError;
use crate::media::MediaElement;
use crate::nodes::{CenterCancel, Gain, GainMessage, Mixer, PitchShifter, PitchShifterMessage};

/// Which path is audible.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Original mix, vocals audible
    #[default]
    Guide,
    /// Center-cancelled mix for singing along
    Singing,
}

impl Mode {
    pub fn from_singing(singing: bool) -> Self {
        if singing {
            Mode::Singing
        } else {
            Mode::Guide
        }
    }

    #[inline]
    pub fn is_singing(self) -> bool {
        self == Mode::Singing
    }

    pub fn toggled(self) -> Self {
        match self {
            Mode::Guide => Mode::Singing,
            Mode::Singing => Mode::Guide,
        }
    }

    /// Gain targets for this mode. Always sum to 1.
    pub fn targets(self) -> CrossfadeTargets {
        match self {
            Mode::Guide => CrossfadeTargets { dry: 1.0, wet: 0.0 },
            Mode::Singing => CrossfadeTargets { dry: 0.0, wet: 1.0 },
        }
    }
}

/// Levels the dry and wet gains are approaching.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CrossfadeTargets {
    pub dry: f32,
    pub wet: f32,
}

/// Handles into a built graph.
struct KaraokeGraph {
    context: AudioContext,
    dry: Handle<GainMessage>,
    wet: Handle<GainMessage>,
    pitch: Option<Handle<PitchShifterMessage>>,
    /// Recorded mode not yet delivered to the gains
    mode_dirty: bool,
    /// Recorded pitch offset not yet delivered to the shifter
    pitch_dirty: bool,
}

enum GraphState {
    Uninitialized,
    Ready(Box<KaraokeGraph>),
    /// The build failed; never retried
    Unavailable,
}

/// Owns the audio context and the dry/wet graph for one session.
///
/// ```
/// use karaoke_graph::{AudioGraphController, EngineConfig, MediaElement, Mode, RingDestination};
///
/// let (media, _feed) = MediaElement::new(48_000, 2, 4096);
/// let (dest, _rendered) = RingDestination::new(48_000, 8192);
/// let mut controller = AudioGraphController::new(EngineConfig::default(), media, dest);
///
/// controller.set_mode(true); // recorded, inert until the graph exists
/// controller.initialize().unwrap();
/// controller.initialize().unwrap(); // no-op
/// assert_eq!(controller.mode(), Mode::Singing);
/// assert_eq!(controller.gain_targets().unwrap().wet, 1.0);
/// ```
pub struct AudioGraphController<D: Destination> {
    config: EngineConfig,
    media: MediaElement,
    destination: D,
    state: GraphState,
    mode: Mode,
    pitch_offset: f32,
}

impl<D: Destination> AudioGraphController<D> {
    pub fn new(config: EngineConfig, media: MediaElement, destination: D) -> Self {
        Self {
            config,
            media,
            destination,
            state: GraphState::Uninitialized,
            mode: Mode::Guide,
            pitch_offset: 0.0,
        }
    }

    /// Build the graph if it has never been built.
    ///
    /// Returns an error only from the call whose build attempt failed. After
    /// that the controller is unavailable and every later call is a no-op.
    pub fn initialize(&mut self) -> Result<(), GraphError> {
        if !matches!(self.state, GraphState::Uninitialized) {
            return Ok(());
        }

        match self.build() {
            Ok(mut graph) => {
                graph.mode_dirty = self.mode != Mode::Guide;
                graph.pitch_dirty = graph.pitch.is_some() && self.pitch_offset != 0.0;
                tracing::info!(
                    sample_rate = graph.context.sample_rate(),
                    nodes = graph.context.engine().node_count(),
                    pitch_stage = graph.pitch.is_some(),
                    "karaoke graph built"
                );
                self.state = GraphState::Ready(Box::new(graph));
                self.flush();
                Ok(())
            }
            Err(err) => {
                tracing::debug!(%err, "karaoke graph build failed");
                self.state = GraphState::Unavailable;
                Err(err)
            }
        }
    }

    fn build(&mut self) -> Result<KaraokeGraph, GraphError> {
        self.config.validate()?;
        let source = self.media.tap()?;
        let mut context = AudioContext::new(&mut self.destination, &self.config)?;
        let engine = context.engine_mut();
        let sample_rate = engine.sample_rate();

        let source = engine.add(source);
        let (dry, wet, pitch) = if self.config.pitch.enabled {
            let pitch = engine.add(PitchShifter::new(self.config.pitch, sample_rate));
            engine.connect(&source, &pitch)?;
            let (dry, wet) = wire_paths(engine, &pitch, &self.config)?;
            (dry, wet, Some(pitch))
        } else {
            let (dry, wet) = wire_paths(engine, &source, &self.config)?;
            (dry, wet, None)
        };

        Ok(KaraokeGraph {
            context,
            dry,
            wet,
            pitch,
            mode_dirty: false,
            pitch_dirty: false,
        })
    }

    /// Switch between Guide (`false`) and Singing (`true`).
    ///
    /// The gains approach their new targets exponentially; repeated calls
    /// with the same value change nothing.
    pub fn set_mode(&mut self, singing: bool) {
        let mode = Mode::from_singing(singing);
        if mode != self.mode {
            tracing::debug!(?mode, "mode changed");
        }
        self.mode = mode;
        if let GraphState::Ready(graph) = &mut self.state {
            graph.mode_dirty = true;
        }
        self.flush();
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Retarget the pitch shifter, `offset` in `-1.0..=1.0`.
    ///
    /// Ignored (but recorded) when the graph has no pitch stage.
    pub fn set_pitch_offset(&mut self, offset: f32) {
        let offset = if offset.is_finite() { offset.clamp(-1.0, 1.0) } else { 0.0 };
        self.pitch_offset = offset;
        if let GraphState::Ready(graph) = &mut self.state {
            if graph.pitch.is_some() {
                graph.pitch_dirty = true;
            } else {
                tracing::debug!(offset, "no pitch stage, offset recorded only");
            }
        }
        self.flush();
    }

    #[inline]
    pub fn pitch_offset(&self) -> f32 {
        self.pitch_offset
    }

    /// Resume the context if it is suspended. Safe in any state.
    pub fn resume_if_suspended(&mut self) {
        if let GraphState::Ready(graph) = &mut self.state {
            if graph.context.resume() {
                tracing::info!("audio context resumed");
            }
        }
    }

    /// Gain targets, once the graph is built.
    pub fn gain_targets(&self) -> Option<CrossfadeTargets> {
        match self.state {
            GraphState::Ready(_) => Some(self.mode.targets()),
            _ => None,
        }
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.state, GraphState::Ready(_))
    }

    /// Whether a build was attempted and failed
    pub fn is_unavailable(&self) -> bool {
        matches!(self.state, GraphState::Unavailable)
    }

    pub fn has_pitch_stage(&self) -> bool {
        matches!(&self.state, GraphState::Ready(graph) if graph.pitch.is_some())
    }

    /// Rate the graph renders at, once built
    pub fn sample_rate(&self) -> Option<u32> {
        match &self.state {
            GraphState::Ready(graph) => Some(graph.context.sample_rate()),
            _ => None,
        }
    }

    pub fn context_state(&self) -> Option<ContextState> {
        match &self.state {
            GraphState::Ready(graph) => Some(graph.context.state()),
            _ => None,
        }
    }

    /// Nodes in the built graph, including the sink.
    pub fn node_count(&self) -> Option<usize> {
        match &self.state {
            GraphState::Ready(graph) => Some(graph.context.engine().node_count()),
            _ => None,
        }
    }

    /// Render one block. Returns whether anything was rendered.
    pub fn process(&mut self) -> bool {
        self.flush();
        match &mut self.state {
            GraphState::Ready(graph) => graph.context.process(),
            _ => false,
        }
    }

    /// Deliver recorded parameters the graph has not seen yet.
    ///
    /// A full queue leaves the flag set; the value is sent again on the next
    /// parameter change or block.
    fn flush(&mut self) {
        let GraphState::Ready(graph) = &mut self.state else {
            return;
        };

        if graph.mode_dirty {
            let targets = self.mode.targets();
            let time_constant = self.config.crossfade.time_constant;
            let dry = graph.dry.send(GainMessage::SetTarget {
                target: targets.dry,
                time_constant,
            });
            let wet = graph.wet.send(GainMessage::SetTarget {
                target: targets.wet,
                time_constant,
            });
            graph.mode_dirty = dry.is_err() || wet.is_err();
            if graph.mode_dirty {
                tracing::warn!(mode = ?self.mode, "gain queue full, mode change deferred");
            }
        }

        if graph.pitch_dirty {
            if let Some(pitch) = graph.pitch.as_mut() {
                let sent = pitch.send(PitchShifterMessage::SetPitchOffset(self.pitch_offset));
                graph.pitch_dirty = sent.is_err();
                if graph.pitch_dirty {
                    tracing::warn!(offset = self.pitch_offset, "pitch queue full, change deferred");
                }
            } else {
                graph.pitch_dirty = false;
            }
        }
    }
}

/// Split `from` into the dry and wet paths and sum them at the output.
fn wire_paths<M: Send + 'static>(
    engine: &mut Engine,
    from: &Handle<M>,
    config: &EngineConfig,
) -> Result<(Handle<GainMessage>, Handle<GainMessage>), GraphError> {
    let targets = Mode::Guide.targets();

    let dry = engine.add(Gain::new(targets.dry));
    let cancel = engine.add(CenterCancel::new());
    let boost = engine.add(Gain::new(config.crossfade.boost));
    let wet = engine.add(Gain::new(targets.wet));
    let mix = engine.add(Mixer::stereo());

    engine.connect(from, &dry)?;
    engine.connect(from, &cancel)?;
    engine.connect(&cancel, &boost)?;
    engine.connect(&boost, &wet)?;
    engine.connect(&dry, &mix)?;
    engine.connect(&wet, &mix)?;
    engine.output(&mix)?;

    Ok((dry, wet))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::destination::RingDestination;
    use crate::media::MediaFeed;

    fn controller(config: EngineConfig) -> (AudioGraphController<RingDestination>, MediaFeed) {
        let (media, feed) = MediaElement::new(48_000, 2, 4096);
        let (dest, _rendered) = RingDestination::new(48_000, 8192);
        (AudioGraphController::new(config, media, dest), feed)
    }

    #[test]
    fn targets_always_sum_to_one() {
        for mode in [Mode::Guide, Mode::Singing] {
            let t = mode.targets();
            assert_eq!(t.dry + t.wet, 1.0);
        }
    }

    #[test]
    fn operations_before_initialize_are_inert() {
        let (mut ctl, _feed) = controller(EngineConfig::default());
        ctl.resume_if_suspended();
        ctl.set_mode(true);
        ctl.set_pitch_offset(-0.5);
        assert!(!ctl.process());
        assert_eq!(ctl.gain_targets(), None);
        assert_eq!(ctl.context_state(), None);
        assert_eq!(ctl.mode(), Mode::Singing);
        assert_eq!(ctl.pitch_offset(), -0.5);
    }

    #[test]
    fn second_initialize_adds_no_nodes() {
        let (mut ctl, _feed) = controller(EngineConfig::default());
        ctl.initialize().unwrap();
        let nodes = ctl.node_count().unwrap();
        // sink, source, pitch, dry, cancel, boost, wet, mixer
        assert_eq!(nodes, 8);
        ctl.initialize().unwrap();
        assert_eq!(ctl.node_count(), Some(nodes));
        assert!(ctl.has_pitch_stage());
    }

    #[test]
    fn pitchless_variant_skips_the_shifter() {
        let (mut ctl, _feed) = controller(EngineConfig::default().without_pitch());
        ctl.initialize().unwrap();
        assert_eq!(ctl.node_count(), Some(7));
        assert!(!ctl.has_pitch_stage());
        ctl.set_pitch_offset(1.0);
        assert_eq!(ctl.pitch_offset(), 1.0);
    }

    #[test]
    fn failed_build_is_terminal() {
        let (media, _feed) = MediaElement::new(48_000, 2, 64);
        let media = media.with_cross_origin_source("https://video.example/clip");
        let (dest, _rendered) = RingDestination::new(48_000, 1024);
        let mut ctl = AudioGraphController::new(EngineConfig::default(), media, dest);

        assert!(matches!(ctl.initialize(), Err(GraphError::CrossOrigin { .. })));
        assert!(ctl.is_unavailable());
        assert!(ctl.initialize().is_ok());
        ctl.set_mode(true);
        ctl.resume_if_suspended();
        assert_eq!(ctl.gain_targets(), None);
    }

    #[test]
    fn set_mode_is_idempotent() {
        let (mut ctl, _feed) = controller(EngineConfig::default());
        ctl.initialize().unwrap();
        ctl.set_mode(true);
        let once = ctl.gain_targets();
        ctl.set_mode(true);
        assert_eq!(ctl.gain_targets(), once);
        assert_eq!(once, Some(CrossfadeTargets { dry: 0.0, wet: 1.0 }));
    }

    #[test]
    fn context_starts_suspended_and_resumes() {
        let (mut ctl, _feed) = controller(EngineConfig::default());
        ctl.initialize().unwrap();
        assert_eq!(ctl.context_state(), Some(ContextState::Suspended));
        assert!(!ctl.process());
        ctl.resume_if_suspended();
        assert_eq!(ctl.context_state(), Some(ContextState::Running));
        assert!(ctl.process());
    }

    #[test]
    fn pitch_offset_is_clamped() {
        let (mut ctl, _feed) = controller(EngineConfig::default());
        ctl.set_pitch_offset(-4.0);
        assert_eq!(ctl.pitch_offset(), -1.0);
        ctl.set_pitch_offset(f32::INFINITY);
        assert_eq!(ctl.pitch_offset(), 0.0);
    }
}
