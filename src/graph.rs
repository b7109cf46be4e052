//! One fixed-rate processing graph and the message queues of its nodes.
//!
//! Nodes are only ever added, so a [`NodeId`] is the petgraph index of the
//! node it names.

use alloc::boxed::Box;
use alloc::vec;

use dasp_graph::{BoxedNodeSend, Buffer, Input, NodeData, Processor};
use petgraph::graph::NodeIndex;
use rtrb::{Consumer, Producer, RingBuffer};

use crate::error::GraphError;
use crate::node::{AudioNode, NodeId, ProcessContext};

/// A node together with the queue it drains before every block.
struct Slot<N: AudioNode> {
    node: N,
    messages: Consumer<N::Message>,
    ctx: ProcessContext,
}

impl<N: AudioNode> dasp_graph::Node for Slot<N> {
    fn process(&mut self, inputs: &[Input], outputs: &mut [Buffer]) {
        let messages = &mut self.messages;
        let pending = core::iter::from_fn(|| messages.pop().ok());
        self.node.process(&self.ctx, pending, inputs, outputs);
    }
}

type BoxedSlot = BoxedNodeSend;
type InnerGraph = petgraph::graph::Graph<NodeData<BoxedSlot>, ()>;

/// Nodes at one sample rate, processed up to a terminal sink.
pub(crate) struct AudioGraph {
    graph: InnerGraph,
    processor: Processor<InnerGraph>,
    ctx: ProcessContext,
    queue_size: usize,
    terminal: Option<NodeIndex>,
}

impl AudioGraph {
    /// Create a graph whose nodes get message queues of `queue_size` slots
    pub fn with_queue_size(sample_rate: u32, queue_size: usize) -> Self {
        Self {
            graph: InnerGraph::with_capacity(16, 16),
            processor: Processor::with_capacity(16),
            ctx: ProcessContext {
                sample_rate,
                buffer_size: Buffer::LEN,
            },
            queue_size: queue_size.max(1),
            terminal: None,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Add a node, returning its id and the sending end of its queue.
    pub fn add<N: AudioNode>(&mut self, node: N) -> (NodeId, Producer<N::Message>) {
        let (sender, messages) = RingBuffer::new(self.queue_size);
        // sinks have no outputs but dasp_graph still wants one buffer
        let buffers = vec![Buffer::SILENT; node.num_outputs().max(1)];
        let slot = BoxedNodeSend(Box::new(Slot {
            node,
            messages,
            ctx: self.ctx,
        }));

        let index = self.graph.add_node(NodeData::new(slot, buffers));
        (NodeId(index.index() as u32), sender)
    }

    /// Add the sink this graph renders into.
    pub fn add_terminal<N: AudioNode<Message = ()>>(&mut self, sink: N) -> NodeId {
        let (id, _) = self.add(sink);
        self.terminal = Some(NodeIndex::new(id.0 as usize));
        id
    }

    fn index(&self, id: NodeId) -> Result<NodeIndex, GraphError> {
        let index = NodeIndex::new(id.0 as usize);
        if index.index() < self.graph.node_count() {
            Ok(index)
        } else {
            Err(GraphError::Routing(format!("no node {:?} in this graph", id)))
        }
    }

    /// Feed `from`'s outputs into `to`.
    ///
    /// Returns `false` when the edge already existed; a doubled edge would
    /// feed `to` the same signal twice.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> Result<bool, GraphError> {
        let (a, b) = (self.index(from)?, self.index(to)?);
        if self.graph.find_edge(a, b).is_some() {
            return Ok(false);
        }
        self.graph.add_edge(a, b, ());
        tracing::trace!(rate = self.ctx.sample_rate, ?from, ?to, "edge added");
        Ok(true)
    }

    /// Render one block into the terminal sink, if there is one.
    pub fn process(&mut self) {
        if let Some(terminal) = self.terminal {
            self.processor.process(&mut self.graph, terminal);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Silence;

    impl AudioNode for Silence {
        type Message = ();

        fn process(
            &mut self,
            _ctx: &ProcessContext,
            _messages: impl Iterator<Item = ()>,
            _inputs: &[Input],
            outputs: &mut [Buffer],
        ) {
            crate::node::silence(outputs);
        }
    }

    #[test]
    fn duplicate_connections_collapse() {
        let mut graph = AudioGraph::with_queue_size(48_000, 8);
        let (a, _) = graph.add(Silence);
        let (b, _) = graph.add(Silence);
        assert!(graph.connect(a, b).unwrap());
        assert!(!graph.connect(a, b).unwrap());
        assert_eq!(graph.graph.edge_count(), 1);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn ids_from_another_graph_are_rejected() {
        let mut other = AudioGraph::with_queue_size(44_100, 8);
        other.add(Silence);
        let (foreign, _) = other.add(Silence);

        let mut graph = AudioGraph::with_queue_size(48_000, 8);
        let (only, _) = graph.add(Silence);
        assert!(matches!(graph.connect(only, foreign), Err(GraphError::Routing(_))));
    }

    #[test]
    fn queue_depth_bounds_pending_messages() {
        let mut graph = AudioGraph::with_queue_size(48_000, 2);
        let (_, mut sender) = graph.add(Silence);
        assert!(sender.push(()).is_ok());
        assert!(sender.push(()).is_ok());
        assert!(sender.push(()).is_err());
    }
}
