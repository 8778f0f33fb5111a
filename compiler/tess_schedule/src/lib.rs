//! Memory-lifetime analysis for the Tess compiler backend.
//!
//! This crate provides:
//!
//! - **Memory-location classification** ([`MemoryLocation`],
//!   [`decide_memory_location`]) — every produced value is assigned a
//!   coarse storage category before its buffer record exists. Categories
//!   separate external I/O boundaries and baked-in constants (which must
//!   never share storage or be moved) from ordinary scratch values (whose
//!   storage the allocator may reuse once their lifetimes end).
//!
//! - **Lifetime recording** ([`LifetimeRecorder`]) — simulates one walk of
//!   the graph's execution order and builds, per produced value, the
//!   traversal-step interval during which its storage must stay reserved.
//!
//! - **The buffer table** ([`BufferTable`], [`LogicalBuffer`],
//!   [`Lifetime`]) — the ordered set of logical buffers handed to the
//!   offset allocator and, after it, to codegen.
//!
//! The entry point is [`analyze_lifetimes`], which drives the recorder
//! over a [`Graph`](tess_graph::Graph) honoring the step contract: per
//! visited node, outputs are allocated, retiring input edges released,
//! then the global step advances exactly once.
//!
//! # Design
//!
//! This stage is the same family of problem as register-allocation
//! liveness analysis, but over tensor buffers: each value's `used_count`
//! starts at its fan-out and the value dies when the last consuming edge
//! retires. All counters (buffer IDs, the step clock) are fields of one
//! recorder instance constructed fresh per pass — analyzing two graphs
//! concurrently just means two recorders, with no shared state.
//!
//! # Crate dependencies
//!
//! `tess_graph` for the program representation; `rustc-hash` for the
//! connector→buffer identity map; `tracing` for pass instrumentation;
//! `thiserror` for the pass error type. No allocator dependency — offset
//! assignment consumes the table this crate produces.

mod buffer;
mod classify;
mod pass;
mod recorder;

#[cfg(test)]
mod test_helpers;

pub use buffer::{BufferId, BufferTable, Lifetime, LogicalBuffer};
pub use classify::decide_memory_location;
pub use pass::analyze_lifetimes;
pub use recorder::{LifetimeRecorder, ScheduleError};

/// Coarse storage category of a logical buffer.
///
/// Decided once per produced value, before the buffer record is created,
/// and consumed by the downstream offset allocator: buffers are placed
/// per category, and only [`Data`](MemoryLocation::Data) buffers are
/// candidates for storage reuse between non-overlapping lifetimes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemoryLocation {
    /// External graph input. Filled by the caller before execution;
    /// never shared, never moved.
    Input,
    /// External graph output. Read by the caller after execution;
    /// never shared, never moved.
    Output,
    /// Persistent constant/weight data baked into the module image.
    Rdata,
    /// Ordinary scratch value. The only category eligible for storage
    /// reuse between buffers whose lifetimes never overlap.
    Data,
    /// Most conservative category: storage stays reserved and private for
    /// the whole program, regardless of lifetime. Returned whenever the
    /// caller suppresses buffer aliasing for a pass.
    Pinned,
}

impl MemoryLocation {
    /// Returns `true` if buffers in this category may share storage with
    /// other non-overlapping buffers.
    pub fn is_aliasable(self) -> bool {
        matches!(self, MemoryLocation::Data)
    }
}
