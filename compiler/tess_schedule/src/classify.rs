//! Memory-location classifier.
//!
//! Pure decision table mapping a produced value to its storage category.
//! Consulted exactly once per value, by the recorder, before the buffer
//! record is constructed — the category is fixed for the rest of the
//! pass and the allocator that follows.

use tess_graph::{Graph, OpKind, OutputId};

use crate::MemoryLocation;

/// Decide the storage category for a produced value.
///
/// The decision table, first match wins:
///
/// 1. `skip_buffer_alias` → [`Pinned`](MemoryLocation::Pinned). The caller
///    is forcing stability for every buffer in the pass; the most
///    conservative category wins regardless of the value's own role.
/// 2. Produced by an `Input` node → [`Input`](MemoryLocation::Input).
/// 3. Produced by a `Const` node → [`Rdata`](MemoryLocation::Rdata).
/// 4. Consumed by any `Output` node → [`Output`](MemoryLocation::Output).
///    The value crosses the external boundary, so its storage cannot be
///    handed to another buffer even after its last internal reader.
/// 5. Otherwise → [`Data`](MemoryLocation::Data), ordinary reusable
///    scratch.
pub fn decide_memory_location(
    graph: &Graph,
    output: OutputId,
    skip_buffer_alias: bool,
) -> MemoryLocation {
    if skip_buffer_alias {
        return MemoryLocation::Pinned;
    }

    let conn = graph.output(output);
    match graph.node(conn.producer).op {
        OpKind::Input => MemoryLocation::Input,
        OpKind::Const => MemoryLocation::Rdata,
        _ => {
            let feeds_boundary = conn
                .consumers()
                .iter()
                .any(|&n| graph.node(n).op == OpKind::Output);
            if feeds_boundary {
                MemoryLocation::Output
            } else {
                MemoryLocation::Data
            }
        }
    }
}
