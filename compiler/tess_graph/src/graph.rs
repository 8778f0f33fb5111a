//! Operator graph: nodes, output connectors, and edge wiring.
//!
//! The graph is an arena. Nodes and connectors live in `Vec`s owned by
//! [`Graph`] and are referenced by [`NodeId`] / [`OutputId`] indices.
//! Intra-graph references are always indices, never `&`/`Rc` back-edges,
//! so pushing new nodes never invalidates an existing handle.
//!
//! Edges are stored on both endpoints: a node lists the connectors it
//! reads (`inputs`), and a connector lists the nodes reading it
//! (`consumers`). The consumer list is maintained by [`Graph::add_node`]
//! and counts one entry per edge — a node reading the same connector
//! through two operands contributes two edges.

use smallvec::SmallVec;

use crate::{DType, Shape};

// ── ID newtypes ─────────────────────────────────────────────────────

/// Operator node ID within a [`Graph`].
///
/// IDs are allocated sequentially starting from 0 and double as the
/// node's position in the execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Create a new node ID from a raw index.
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw `u32` value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Get the index as `usize` (for indexing into `Vec`s).
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Output connector ID within a [`Graph`].
///
/// Each `OutputId` identifies the single production point of one tensor
/// value. IDs are allocated sequentially starting from 0 and are stable
/// for the life of the graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct OutputId(u32);

impl OutputId {
    /// Create a new output ID from a raw index.
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw `u32` value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Get the index as `usize` (for indexing into `Vec`s).
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// ── Operator kinds ──────────────────────────────────────────────────

/// Element-wise unary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryKind {
    Neg,
    Abs,
    Exp,
    Sqrt,
    Relu,
}

/// Element-wise binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryKind {
    Add,
    Sub,
    Mul,
    Div,
    Max,
    Min,
}

/// Reduction operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReduceKind {
    Sum,
    Mean,
    Max,
    Min,
}

/// Operator label for a [`Node`].
///
/// Backend analyses only interpret the boundary roles: `Input` and
/// `Output` mark the graph's external I/O, `Const` marks weights folded
/// into the module image. Every other kind is an ordinary compute
/// operator as far as memory planning is concerned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// External graph input. No operands, one produced value.
    Input,
    /// Constant/weight data baked into the compiled module.
    Const,
    /// External graph output. Consumes one value, produces none.
    Output,
    Unary(UnaryKind),
    Binary(BinaryKind),
    MatMul,
    Reshape,
    Transpose,
    Concat,
    Reduce(ReduceKind),
}

// ── Nodes and connectors ────────────────────────────────────────────

/// One operator in the graph.
#[derive(Clone, Debug)]
pub struct Node {
    /// This node's ID (its position in the execution order).
    pub id: NodeId,
    /// Operator label.
    pub op: OpKind,
    /// Connectors this node reads, one entry per operand edge.
    pub inputs: Vec<OutputId>,
    /// Connectors this node produces.
    pub outputs: SmallVec<[OutputId; 2]>,
}

/// An output connector: the production point of one tensor value.
#[derive(Clone, Debug)]
pub struct Output {
    /// This connector's ID.
    pub id: OutputId,
    /// The node producing this value.
    pub producer: NodeId,
    /// Element type of the produced value.
    pub dtype: DType,
    /// Natural shape of the produced value.
    pub shape: Shape,
    /// Consuming nodes, one entry per edge. Maintained by `Graph::add_node`.
    consumers: Vec<NodeId>,
}

impl Output {
    /// Nodes consuming this value, one entry per edge.
    pub fn consumers(&self) -> &[NodeId] {
        &self.consumers
    }

    /// Number of consuming edges fanned out from this connector.
    pub fn fan_out(&self) -> usize {
        self.consumers.len()
    }
}

// ── Graph ───────────────────────────────────────────────────────────

/// A compiled dataflow graph.
///
/// Built front-to-back by the graph builder; node insertion order is the
/// execution order. Operand connectors must already exist when a node is
/// added, so the graph is topologically ordered by construction.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    outputs: Vec<Output>,
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node, wiring its operand edges and creating one connector
    /// per entry in `outputs`.
    ///
    /// Each operand occurrence in `inputs` registers one consuming edge on
    /// the referenced connector. Returns the new node's ID; its produced
    /// connectors are in `self.node(id).outputs`.
    pub fn add_node(&mut self, op: OpKind, inputs: &[OutputId], outputs: Vec<(DType, Shape)>) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);

        for &input in inputs {
            self.outputs[input.index()].consumers.push(id);
        }

        let mut produced = SmallVec::with_capacity(outputs.len());
        for (dtype, shape) in outputs {
            let out_id = OutputId::new(self.outputs.len() as u32);
            self.outputs.push(Output {
                id: out_id,
                producer: id,
                dtype,
                shape,
                consumers: Vec::new(),
            });
            produced.push(out_id);
        }

        self.nodes.push(Node {
            id,
            op,
            inputs: inputs.to_vec(),
            outputs: produced,
        });
        id
    }

    /// Look up a node by ID.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Look up an output connector by ID.
    pub fn output(&self, id: OutputId) -> &Output {
        &self.outputs[id.index()]
    }

    /// Iterate nodes in execution order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Iterate output connectors in creation order.
    pub fn outputs(&self) -> impl Iterator<Item = &Output> {
        self.outputs.iter()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of output connectors.
    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }
}
