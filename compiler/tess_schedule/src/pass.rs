//! The lifetime-analysis pass: one recorded walk of the execution order.
//!
//! This is the traversal driver the recorder's step contract is written
//! against. Per visited node, in this order:
//!
//! 1. `allocate` every connector the node produces;
//! 2. `release` every operand edge the node retires;
//! 3. exactly one `advance`.
//!
//! Allocating before releasing within the same step means an output's
//! buffer can never silently land on top of storage freed by the same
//! operator — whether two non-overlapping buffers may share storage is
//! the allocator's call, made later from the interval data recorded here.

use tess_graph::Graph;

use crate::buffer::BufferTable;
use crate::recorder::{LifetimeRecorder, ScheduleError};

/// Run the lifetime-analysis pass over a graph.
///
/// Walks the execution order decided by the graph builder and yields the
/// completed buffer table, or the fatal error that aborted the pass. On
/// error the partially built table is discarded with the recorder — there
/// is no partial success.
pub fn analyze_lifetimes(
    graph: &Graph,
    skip_buffer_alias: bool,
) -> Result<BufferTable, ScheduleError> {
    tracing::debug!(
        nodes = graph.node_count(),
        connectors = graph.output_count(),
        skip_buffer_alias,
        "analyzing lifetimes"
    );

    let mut recorder = LifetimeRecorder::new(skip_buffer_alias);

    for node in graph.nodes() {
        for &output in &node.outputs {
            recorder.allocate(graph, output);
        }
        for &input in &node.inputs {
            recorder.release(input)?;
        }
        recorder.advance();
    }

    tracing::debug!(
        buffers = recorder.buffers().len(),
        steps = recorder.step(),
        "lifetime analysis complete"
    );

    Ok(recorder.finish())
}
