//! High-level audio engine API

use core::marker::PhantomData;

use hashbrown::HashMap;
use rtrb::RingBuffer;

use crate::error::GraphError;
use crate::graph::AudioGraph;
use crate::node::{AudioNode, NodeId};
use crate::nodes::{ResamplingSource, RtrbSink};

/// A handle for sending messages to a node in the audio graph.
///
/// Handles are returned when you add a node to an [`Engine`] and provide two capabilities:
/// 1. **Connections** - Pass handles to [`Engine::connect`] or [`Engine::output`]
/// 2. **Messages** - Send parameter updates via [`Handle::send`]
///
/// # Message Delivery
///
/// Messages are buffered in a lock-free ring buffer and processed at the start
/// of each audio block. If the buffer is full, [`Handle::send`] returns `Err(msg)`
/// with the message that couldn't be sent.
pub struct Handle<M: Send + 'static> {
    pub(crate) node_id: NodeId,
    pub(crate) graph_id: usize,
    pub(crate) sender: rtrb::Producer<M>,
    pub(crate) _marker: PhantomData<M>,
}

impl<M: Send + 'static> Handle<M> {
    /// Send a message to the node.
    ///
    /// The message will be processed at the start of the next audio block.
    /// This is lock-free and safe to call from any thread.
    ///
    /// # Returns
    ///
    /// - `Ok(())` if the message was queued successfully
    /// - `Err(msg)` if the queue is full (message dropped)
    pub fn send(&mut self, msg: M) -> Result<(), M> {
        self.sender.push(msg).map_err(|rtrb::PushError::Full(m)| m)
    }

    /// Identifier of the node behind this handle.
    pub fn id(&self) -> NodeId {
        self.node_id
    }
}

/// Internal tracking for sub-graphs that need resampling
struct SubGraph {
    graph: AudioGraph,
    /// Node ID of the RtrbSink in this sub-graph (terminal that feeds main graph)
    sink_node: NodeId,
    /// Node ID of the ResamplingSource in the main graph
    resampler_node: NodeId,
    /// How many blocks we've processed
    blocks_processed: u64,
}

/// The audio engine - manages nodes, connections, and block processing.
///
/// # Building the Graph
///
/// 1. Add nodes with [`add`](Self::add) - returns a [`Handle`] for connections and messages
/// 2. Connect nodes with [`connect`](Self::connect)
/// 3. Connect final node(s) to output with [`output`](Self::output)
///
/// ```
/// # use karaoke_graph::{Engine, nodes::{Gain, Mixer, RtrbSink}};
/// let (producer, _consumer) = rtrb::RingBuffer::<f32>::new(4096);
/// let mut engine = Engine::new(48_000).with_output(RtrbSink::stereo(producer));
///
/// let dry = engine.add(Gain::new(1.0));
/// let wet = engine.add(Gain::new(0.0));
/// let mix = engine.add(Mixer::stereo());
///
/// engine.connect(&dry, &mix).unwrap();
/// engine.connect(&wet, &mix).unwrap();
/// engine.output(&mix).unwrap();
/// engine.process();
/// ```
pub struct Engine {
    /// Main output graph at device/output sample rate
    main_graph: AudioGraph,
    /// Output sample rate
    sample_rate: u32,
    /// Number of output channels
    channels: usize,
    /// Message queue size handed to new graphs
    queue_size: usize,

    /// Sub-graphs for nodes at different sample rates
    /// Key: the sample rate of the sub-graph
    sub_graphs: HashMap<u32, SubGraph>,

    /// The output sink node in main graph
    sink_node: Option<NodeId>,

    /// Blocks processed on main graph (for scheduling)
    main_blocks_processed: u64,
}

impl Engine {
    /// Create a new engine with an explicit sample rate.
    ///
    /// This creates an engine without an output sink. Use [`with_output`](Self::with_output)
    /// to add one.
    pub fn new(sample_rate: u32) -> Self {
        Self::with_queue_size(sample_rate, 64)
    }

    /// Create an engine whose nodes get message queues of `queue_size` slots.
    pub fn with_queue_size(sample_rate: u32, queue_size: usize) -> Self {
        Self {
            main_graph: AudioGraph::with_queue_size(sample_rate, queue_size),
            sample_rate,
            channels: 2,
            queue_size,
            sub_graphs: HashMap::new(),
            sink_node: None,
            main_blocks_processed: 0,
        }
    }

    /// Set the number of output channels (builder pattern).
    ///
    /// Default is 2 (stereo). This affects sub-graph creation for sample rate conversion.
    pub fn with_channels(mut self, channels: usize) -> Self {
        self.channels = channels.max(1);
        self
    }

    /// Add the output sink (builder pattern).
    pub fn with_output<S: AudioNode<Message = ()>>(mut self, sink: S) -> Self {
        self.sink_node = Some(self.main_graph.add_terminal(sink));
        self
    }

    /// Get the output sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Total number of nodes across the main graph and all sub-graphs.
    pub fn node_count(&self) -> usize {
        self.main_graph.node_count()
            + self.sub_graphs.values().map(|s| s.graph.node_count()).sum::<usize>()
    }

    /// Add a node to the audio graph.
    ///
    /// If the node reports a [`native_sample_rate`](AudioNode::native_sample_rate)
    /// different from the output, the engine creates a sub-graph at the node's
    /// native rate and bridges it to the main graph with a resampler.
    pub fn add<N: AudioNode>(&mut self, node: N) -> Handle<N::Message> {
        match node.native_sample_rate() {
            // graph id 0 is the main graph, so a zero rate cannot get a sub-graph
            Some(0) => tracing::warn!("node reports a zero sample rate, running it at the output rate"),
            Some(rate) if rate != self.sample_rate => return self.add_to_subgraph(node, rate),
            _ => {}
        }

        let (node_id, sender) = self.main_graph.add(node);

        Handle {
            node_id,
            graph_id: 0,
            sender,
            _marker: PhantomData,
        }
    }

    /// Add a node to a sub-graph at a specific sample rate
    fn add_to_subgraph<N: AudioNode>(&mut self, node: N, rate: u32) -> Handle<N::Message> {
        let channels = node.num_outputs().max(self.channels);
        let queue_size = self.queue_size;
        let main_graph = &mut self.main_graph;

        let sub = self
            .sub_graphs
            .entry(rate)
            .or_insert_with(|| Self::create_subgraph(main_graph, rate, channels, queue_size));

        let (node_id, sender) = sub.graph.add(node);

        Handle {
            node_id,
            graph_id: rate as usize,
            sender,
            _marker: PhantomData,
        }
    }

    /// Create a new sub-graph with resampling bridge to main graph
    fn create_subgraph(
        main_graph: &mut AudioGraph,
        rate: u32,
        channels: usize,
        queue_size: usize,
    ) -> SubGraph {
        // Ring buffer between sub-graph and main graph, ~100ms deep
        let buffer_size = ((rate as f32 * 0.1) as usize * channels).next_power_of_two().max(8192);
        let (producer, consumer) = RingBuffer::<f32>::new(buffer_size);

        let mut graph = AudioGraph::with_queue_size(rate, queue_size);

        // RtrbSink is the terminal that feeds the main graph
        let sink_node = graph.add_terminal(RtrbSink::new(producer, channels));
        let (resampler_node, _) = main_graph.add(ResamplingSource::new(consumer, channels, rate));

        tracing::debug!(rate, channels, "created resampling sub-graph");

        SubGraph {
            graph,
            sink_node,
            resampler_node,
            blocks_processed: 0,
        }
    }

    /// Connect two nodes together.
    ///
    /// Audio flows from `from` to `to`. Several sources may feed one
    /// destination; what happens to them depends on the destination
    /// (a [`Mixer`](crate::nodes::Mixer) sums them).
    ///
    /// Connections out of a sub-graph into the main graph route through the
    /// resampling bridge. Connecting *into* a sub-graph from elsewhere is
    /// not supported and returns [`GraphError::Routing`].
    pub fn connect<M1, M2>(&mut self, from: &Handle<M1>, to: &Handle<M2>) -> Result<(), GraphError>
    where
        M1: Send + 'static,
        M2: Send + 'static,
    {
        // graph_id: 0 = main graph, otherwise it's the sample rate of a sub-graph
        match (from.graph_id, to.graph_id) {
            (0, 0) => {
                self.main_graph.connect(from.node_id, to.node_id)?;
                Ok(())
            }
            (r1, r2) if r1 == r2 => {
                let sub = self.sub_graph_mut(r1)?;
                sub.graph.connect(from.node_id, to.node_id)?;
                Ok(())
            }
            (rate, 0) => self.bridge(rate, from.node_id, to.node_id),
            (r1, r2) => Err(GraphError::Routing(format!(
                "cannot connect across sub-graphs (from graph {} to graph {})",
                r1, r2
            ))),
        }
    }

    /// Connect a node directly to the audio output.
    ///
    /// If the node is in a sub-graph (different sample rate), it is routed
    /// through the resampler automatically.
    pub fn output<M: Send + 'static>(&mut self, handle: &Handle<M>) -> Result<(), GraphError> {
        let sink_id = self
            .sink_node
            .ok_or_else(|| GraphError::Routing("no output sink configured".into()))?;

        if handle.graph_id == 0 {
            self.main_graph.connect(handle.node_id, sink_id)?;
            Ok(())
        } else {
            self.bridge(handle.graph_id, handle.node_id, sink_id)
        }
    }

    fn bridge(&mut self, graph_id: usize, from: NodeId, to: NodeId) -> Result<(), GraphError> {
        let sub = self
            .sub_graphs
            .get_mut(&(graph_id as u32))
            .ok_or_else(|| GraphError::Routing(format!("unknown sub-graph {}", graph_id)))?;

        sub.graph.connect(from, sub.sink_node)?;
        let resampler = sub.resampler_node;
        self.main_graph.connect(resampler, to)?;
        Ok(())
    }

    fn sub_graph_mut(&mut self, graph_id: usize) -> Result<&mut SubGraph, GraphError> {
        self.sub_graphs
            .get_mut(&(graph_id as u32))
            .ok_or_else(|| GraphError::Routing(format!("unknown sub-graph {}", graph_id)))
    }

    /// Process one block of audio (64 samples).
    ///
    /// 1. Processes any sub-graphs to keep resamplers fed
    /// 2. Processes the main graph to generate output
    pub fn process(&mut self) {
        let main_rate = self.sample_rate as f64;
        let main_blocks = self.main_blocks_processed + 1;

        for (rate, sub) in self.sub_graphs.iter_mut() {
            let rate_ratio = *rate as f64 / main_rate;
            // How many sub-graph blocks needed to feed main_blocks of output
            let blocks_needed = ((main_blocks as f64) * rate_ratio).ceil() as u64 + 4;

            while sub.blocks_processed < blocks_needed {
                sub.graph.process();
                sub.blocks_processed += 1;
            }
        }

        self.main_graph.process();
        self.main_blocks_processed += 1;
    }

    /// Number of main-graph blocks processed so far.
    pub fn blocks_processed(&self) -> u64 {
        self.main_blocks_processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{Gain, Mixer};

    #[test]
    fn output_without_sink_is_a_routing_error() {
        let mut engine = Engine::new(48_000);
        let gain = engine.add(Gain::new(1.0));
        assert!(matches!(engine.output(&gain), Err(GraphError::Routing(_))));
    }

    #[test]
    fn duplicate_routes_are_not_an_error() {
        let (producer, _consumer) = RingBuffer::<f32>::new(1024);
        let mut engine = Engine::new(48_000).with_output(RtrbSink::stereo(producer));
        let gain = engine.add(Gain::new(1.0));
        let mix = engine.add(Mixer::stereo());
        engine.connect(&gain, &mix).unwrap();
        engine.connect(&gain, &mix).unwrap();
        engine.output(&mix).unwrap();
        engine.output(&mix).unwrap();
        assert_eq!(engine.node_count(), 3);
    }

    #[test]
    fn nodes_land_in_main_graph_without_native_rate() {
        let (producer, _consumer) = RingBuffer::<f32>::new(1024);
        let mut engine = Engine::new(44_100).with_output(RtrbSink::stereo(producer));
        let mix = engine.add(Mixer::stereo());
        assert_eq!(mix.graph_id, 0);
        assert_eq!(engine.node_count(), 2);
    }
}
