//! Shared test utilities for the lifetime-analysis modules.
//!
//! Graph-building shorthands used across the `classify`, `recorder`, and
//! end-to-end tests. Every helper returns the connector of the value it
//! produced, which is what the analysis operates on. Only compiled in
//! test builds.

use tess_graph::{BinaryKind, DType, Graph, OpKind, OutputId, Shape, UnaryKind};

/// Add an external input producing one `f32` value of the given shape.
pub(crate) fn graph_input(g: &mut Graph, dims: &[usize]) -> OutputId {
    let node = g.add_node(OpKind::Input, &[], vec![(DType::F32, Shape::new(dims))]);
    g.node(node).outputs[0]
}

/// Add a constant (weight) producing one `f32` value of the given shape.
pub(crate) fn constant(g: &mut Graph, dims: &[usize]) -> OutputId {
    let node = g.add_node(OpKind::Const, &[], vec![(DType::F32, Shape::new(dims))]);
    g.node(node).outputs[0]
}

/// Add a relu consuming `x`, producing a same-shaped value.
pub(crate) fn relu(g: &mut Graph, x: OutputId) -> OutputId {
    let out = (g.output(x).dtype, g.output(x).shape.clone());
    let node = g.add_node(OpKind::Unary(UnaryKind::Relu), &[x], vec![out]);
    g.node(node).outputs[0]
}

/// Add a binary add consuming `a` and `b`, shaped like `a`.
pub(crate) fn add(g: &mut Graph, a: OutputId, b: OutputId) -> OutputId {
    let out = (g.output(a).dtype, g.output(a).shape.clone());
    let node = g.add_node(OpKind::Binary(BinaryKind::Add), &[a, b], vec![out]);
    g.node(node).outputs[0]
}

/// Mark `x` as an external graph output.
pub(crate) fn graph_output(g: &mut Graph, x: OutputId) {
    g.add_node(OpKind::Output, &[x], vec![]);
}
