//! Dataflow-graph IR for the Tess compiler backend.
//!
//! This crate provides the compiled program representation that the
//! backend's analysis stages consume:
//!
//! - **[`Graph`]** — an arena of operator nodes and output connectors.
//!   Nodes and connectors are referenced by [`NodeId`] / [`OutputId`]
//!   integer handles, never by address, so handles stay valid while the
//!   arena grows.
//! - **[`Node`]** — one operator: an [`OpKind`] label, the connectors it
//!   reads, and the connectors it produces.
//! - **[`Output`]** — an output connector: the single production point of
//!   a tensor value, carrying its [`DType`], [`Shape`], and the consuming
//!   edges fanned out from it.
//!
//! # Execution order
//!
//! The graph builder (or the optimizer rewriting its output) decides
//! operator order; this crate records it. Node insertion order **is** the
//! execution order, and [`Graph::nodes`] yields nodes in that order.
//! Downstream passes that walk the graph (lifetime analysis, codegen)
//! follow it without re-sorting.
//!
//! # Crate dependencies
//!
//! Only `smallvec` — dimension lists and per-node output lists are almost
//! always tiny. No backend or allocator dependency; this crate is pure
//! program representation.

mod dtype;
mod graph;
mod shape;

pub use dtype::DType;
pub use graph::{BinaryKind, Graph, Node, NodeId, OpKind, Output, OutputId, ReduceKind, UnaryKind};
pub use shape::Shape;
