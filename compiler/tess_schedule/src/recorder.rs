//! Lifetime recorder — the owner of one pass's buffer state.
//!
//! The recorder simulates a single walk of the execution order. The
//! traversal driver reports three kinds of events:
//!
//! - [`allocate`](LifetimeRecorder::allocate) — a value came into
//!   existence at the current step;
//! - [`release`](LifetimeRecorder::release) — one consuming edge of a
//!   value retired;
//! - [`advance`](LifetimeRecorder::advance) — one operator finished, the
//!   global step clock ticks.
//!
//! Every counter (buffer IDs, the step clock) lives on the recorder
//! instance, so two graphs analyzed at once simply use two recorders.
//! Buffers are kept in a `Vec` and cross-referenced by [`BufferId`]
//! index; the connector→buffer identity map stores indices too, so table
//! growth never invalidates a reference.

use rustc_hash::FxHashMap;
use thiserror::Error;

use tess_graph::{Graph, OutputId};

use crate::buffer::{BufferId, BufferTable, Lifetime, LogicalBuffer};
use crate::classify::decide_memory_location;

/// Fatal failure of a lifetime-analysis pass.
///
/// There is no partial success: on error the caller drops the recorder
/// and with it the partially built table.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// A consuming edge retired more times than the value's fan-out.
    /// Always a dependency-accounting defect in the traversal driver,
    /// never a condition to clamp or repair.
    #[error(
        "buffer {} (connector {}) released after its use count reached zero",
        .buffer.raw(),
        .output.raw()
    )]
    DoubleRelease {
        /// The connector whose edge over-retired.
        output: OutputId,
        /// The already-dead buffer backing it.
        buffer: BufferId,
    },
}

/// Records, per produced value, the traversal-step interval during which
/// its backing storage must remain reserved.
///
/// One recorder per graph per pass. Consumed by
/// [`finish`](LifetimeRecorder::finish) to yield the [`BufferTable`].
pub struct LifetimeRecorder {
    buffers: Vec<LogicalBuffer>,
    buffer_map: FxHashMap<OutputId, BufferId>,
    step: u32,
    skip_buffer_alias: bool,
}

impl LifetimeRecorder {
    /// Create a recorder for one analysis pass.
    ///
    /// With `skip_buffer_alias` set, every value classifies as
    /// [`Pinned`](crate::MemoryLocation::Pinned) and the resulting table
    /// offers the allocator no aliasing candidates.
    pub fn new(skip_buffer_alias: bool) -> Self {
        Self {
            buffers: Vec::new(),
            buffer_map: FxHashMap::default(),
            step: 0,
            skip_buffer_alias,
        }
    }

    /// Record the creation of a value.
    ///
    /// Idempotent: re-visiting a connector already backed by a buffer
    /// (shared or diamond-shaped references) is a no-op. Otherwise the
    /// value is classified and a buffer is appended with the next ID,
    /// `birth` at the current step, `used_count` at the connector's
    /// fan-out, and its layout slot initialized to the natural shape.
    pub fn allocate(&mut self, graph: &Graph, output: OutputId) {
        if self.buffer_map.contains_key(&output) {
            return;
        }

        let conn = graph.output(output);
        let location = decide_memory_location(graph, output, self.skip_buffer_alias);
        let id = BufferId::new(self.buffers.len() as u32);

        tracing::trace!(
            buffer = id.raw(),
            connector = output.raw(),
            ?location,
            fan_out = conn.fan_out(),
            birth = self.step,
            "allocate"
        );

        self.buffers.push(LogicalBuffer {
            id,
            output,
            location,
            dtype: conn.dtype,
            shape: conn.shape.clone(),
            strides_shape: conn.shape.clone(),
            lifetime: Lifetime {
                birth: self.step,
                age: 0,
                used_count: conn.fan_out() as u32,
            },
        });
        self.buffer_map.insert(output, id);
    }

    /// Record the retirement of one consuming edge of a value.
    ///
    /// A connector with no recorded buffer is a silent no-op — the value
    /// was never materialized as an independent buffer (folded away
    /// upstream). A connector whose buffer is already dead is a
    /// [`ScheduleError::DoubleRelease`]. Otherwise the use count drops by
    /// one, and the buffer dies exactly when it reaches zero.
    pub fn release(&mut self, output: OutputId) -> Result<(), ScheduleError> {
        let Some(&id) = self.buffer_map.get(&output) else {
            tracing::trace!(connector = output.raw(), "release of unknown connector");
            return Ok(());
        };

        let lifetime = &mut self.buffers[id.index()].lifetime;
        if !lifetime.is_alive() {
            return Err(ScheduleError::DoubleRelease { output, buffer: id });
        }
        lifetime.used_count -= 1;

        tracing::trace!(
            buffer = id.raw(),
            connector = output.raw(),
            remaining = lifetime.used_count,
            "release"
        );
        Ok(())
    }

    /// Advance the global step clock by one and age every live buffer.
    ///
    /// Called exactly once per visited operator, after that operator's
    /// allocations and releases.
    pub fn advance(&mut self) {
        self.step += 1;
        for buffer in &mut self.buffers {
            if buffer.lifetime.is_alive() {
                buffer.lifetime.age += 1;
            }
        }
    }

    /// Steps elapsed so far in this pass.
    pub fn step(&self) -> u32 {
        self.step
    }

    /// Buffers recorded so far, in creation order.
    pub fn buffers(&self) -> &[LogicalBuffer] {
        &self.buffers
    }

    /// Consume the recorder, yielding the completed buffer table.
    pub fn finish(self) -> BufferTable {
        BufferTable::from_parts(self.buffers, self.buffer_map)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use tess_graph::Graph;

    use crate::test_helpers::{graph_input, relu};
    use crate::{BufferId, LifetimeRecorder, ScheduleError};

    /// One input consumed once; exercise the full allocate/advance/release
    /// cycle on the recorder directly.
    fn one_consumer_graph() -> (Graph, tess_graph::OutputId) {
        let mut g = Graph::new();
        let x = graph_input(&mut g, &[4]);
        relu(&mut g, x);
        (g, x)
    }

    #[test]
    fn allocate_is_idempotent() {
        let (g, x) = one_consumer_graph();
        let mut rec = LifetimeRecorder::new(false);

        rec.allocate(&g, x);
        rec.allocate(&g, x);
        rec.allocate(&g, x);

        assert_eq!(rec.buffers().len(), 1);
        assert_eq!(rec.buffers()[0].id, BufferId::new(0));
    }

    #[test]
    fn ids_strictly_increase_in_creation_order() {
        let mut g = Graph::new();
        let a = graph_input(&mut g, &[1]);
        let b = relu(&mut g, a);
        let c = relu(&mut g, b);

        let mut rec = LifetimeRecorder::new(false);
        rec.allocate(&g, a);
        rec.allocate(&g, b);
        rec.allocate(&g, c);

        let ids: Vec<u32> = rec.buffers().iter().map(|buf| buf.id.raw()).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn birth_counts_prior_advances() {
        let (g, x) = one_consumer_graph();
        let mut rec = LifetimeRecorder::new(false);

        rec.advance();
        rec.advance();
        rec.allocate(&g, x);

        assert_eq!(rec.buffers()[0].lifetime.birth, 2);
        assert_eq!(rec.buffers()[0].lifetime.age, 0);
    }

    #[test]
    fn age_grows_only_while_alive() {
        let (g, x) = one_consumer_graph();
        let mut rec = LifetimeRecorder::new(false);

        rec.allocate(&g, x);
        rec.advance();
        rec.advance();
        rec.release(x).unwrap();
        // Dead from here on: further steps must not age the buffer.
        rec.advance();
        rec.advance();

        assert_eq!(rec.buffers()[0].lifetime.age, 2);
        assert!(!rec.buffers()[0].lifetime.is_alive());
    }

    #[test]
    fn released_before_any_advance_has_age_zero() {
        let (g, x) = one_consumer_graph();
        let mut rec = LifetimeRecorder::new(false);

        rec.allocate(&g, x);
        rec.release(x).unwrap();
        rec.advance();

        assert_eq!(rec.buffers()[0].lifetime.age, 0);
    }

    #[test]
    fn unknown_connector_release_is_a_noop() {
        let (g, x) = one_consumer_graph();
        let mut rec = LifetimeRecorder::new(false);
        rec.allocate(&g, x);

        // The relu output was never allocated; releasing it must not fail
        // and must not touch the table.
        let relu_out = tess_graph::OutputId::new(1);
        assert_eq!(rec.release(relu_out), Ok(()));
        assert_eq!(rec.buffers().len(), 1);
        assert_eq!(rec.buffers()[0].lifetime.used_count, 1);
    }

    #[test]
    fn over_release_is_double_release_not_clamp() {
        let (g, x) = one_consumer_graph();
        let mut rec = LifetimeRecorder::new(false);
        rec.allocate(&g, x);

        assert_eq!(rec.release(x), Ok(()));
        assert_eq!(
            rec.release(x),
            Err(ScheduleError::DoubleRelease {
                output: x,
                buffer: BufferId::new(0),
            })
        );
        // used_count stays at zero, not wrapped.
        assert_eq!(rec.buffers()[0].lifetime.used_count, 0);
    }

    #[test]
    fn finish_preserves_table_and_identity_map() {
        let (g, x) = one_consumer_graph();
        let mut rec = LifetimeRecorder::new(false);
        rec.allocate(&g, x);
        rec.advance();

        let table = rec.finish();
        assert_eq!(table.len(), 1);
        let buf = table.buffer_for(x).unwrap();
        assert_eq!(buf.id, BufferId::new(0));
        assert_eq!(buf.shape, buf.strides_shape);
    }

    #[test]
    fn strides_slot_is_independently_mutable() {
        let (g, x) = one_consumer_graph();
        let mut rec = LifetimeRecorder::new(false);
        rec.allocate(&g, x);

        let mut table = rec.finish();
        let id = table.buffer_for(x).unwrap().id;
        *table.strides_shape_mut(id).unwrap() = tess_graph::Shape::from([8]);

        let buf = table.get(id).unwrap();
        assert_eq!(buf.strides_shape, tess_graph::Shape::from([8]));
        // Natural shape untouched.
        assert_eq!(buf.shape, tess_graph::Shape::from([4]));
    }
}
