//! Logical buffers, lifetimes, and the buffer table.
//!
//! A [`LogicalBuffer`] is an abstract memory slot sized to hold one
//! produced value for its lifetime span, independent of any physical
//! address. The [`BufferTable`] is the ordered set of them — insertion
//! order, creation order, and ID order are all the same order — and is
//! what the lifetime pass hands to the offset allocator.

use rustc_hash::FxHashMap;

use tess_graph::{DType, OutputId, Shape};

use crate::MemoryLocation;

/// Logical buffer ID within one analysis pass.
///
/// IDs are assigned in strictly increasing creation order starting from 0
/// and are never reused within a pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct BufferId(u32);

impl BufferId {
    /// Create a new buffer ID from a raw index.
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

/// Traversal-step interval of a logical buffer.
///
/// `birth` is the global step count at creation. `age` counts the steps
/// elapsed while the buffer was alive, so the buffer's storage must stay
/// reserved over steps `[birth, birth + age)`. `used_count` is the number
/// of consuming edges not yet retired; the buffer is alive while it is
/// non-zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lifetime {
    /// Global step count at buffer creation.
    pub birth: u32,
    /// Steps elapsed while alive.
    pub age: u32,
    /// Consuming edges not yet retired.
    pub used_count: u32,
}

impl Lifetime {
    /// A buffer is alive while consuming edges remain.
    #[inline]
    pub fn is_alive(self) -> bool {
        self.used_count > 0
    }

    /// First step past the interval: `birth + age`.
    #[inline]
    pub fn end(self) -> u32 {
        self.birth + self.age
    }

    /// Whether two lifetimes occupy any step in common.
    ///
    /// The allocator's non-overlap query: two `Data` buffers may share
    /// storage only if this is `false`.
    pub fn overlaps(self, other: Lifetime) -> bool {
        // Half-open interval intersection. An empty interval (age 0,
        // released before any step elapsed) overlaps nothing.
        self.birth.max(other.birth) < self.end().min(other.end())
    }
}

/// One logical buffer record.
#[derive(Clone, Debug)]
pub struct LogicalBuffer {
    /// This buffer's ID.
    pub id: BufferId,
    /// The connector whose value this buffer backs.
    pub output: OutputId,
    /// Storage category, decided at creation.
    pub location: MemoryLocation,
    /// Element type of the backed value.
    pub dtype: DType,
    /// Natural shape of the backed value.
    pub shape: Shape,
    /// Physical layout slot. Starts as a copy of `shape`; the allocator
    /// may overwrite it with a padded or reordered layout.
    pub strides_shape: Shape,
    /// Lifetime interval.
    pub lifetime: Lifetime,
}

/// The ordered buffer table produced by one analysis pass.
///
/// Exclusively owned: the recorder that built it is consumed in the
/// process, and the table is moved (not shared) to the allocator.
#[derive(Debug, Default)]
pub struct BufferTable {
    buffers: Vec<LogicalBuffer>,
    by_output: FxHashMap<OutputId, BufferId>,
}

impl BufferTable {
    pub(crate) fn from_parts(
        buffers: Vec<LogicalBuffer>,
        by_output: FxHashMap<OutputId, BufferId>,
    ) -> Self {
        Self { buffers, by_output }
    }

    /// Look up a buffer by ID.
    pub fn get(&self, id: BufferId) -> Option<&LogicalBuffer> {
        self.buffers.get(id.index())
    }

    /// The buffer backing a connector, if the pass materialized one.
    pub fn buffer_for(&self, output: OutputId) -> Option<&LogicalBuffer> {
        let id = *self.by_output.get(&output)?;
        self.buffers.get(id.index())
    }

    /// Mutable access to a buffer's layout slot, for the allocator.
    pub fn strides_shape_mut(&mut self, id: BufferId) -> Option<&mut Shape> {
        self.buffers.get_mut(id.index()).map(|b| &mut b.strides_shape)
    }

    /// Iterate buffers in creation (= ID) order.
    pub fn iter(&self) -> impl Iterator<Item = &LogicalBuffer> {
        self.buffers.iter()
    }

    /// Number of buffers in the table.
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}

impl<'a> IntoIterator for &'a BufferTable {
    type Item = &'a LogicalBuffer;
    type IntoIter = std::slice::Iter<'a, LogicalBuffer>;

    fn into_iter(self) -> Self::IntoIter {
        self.buffers.iter()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::Lifetime;

    fn lt(birth: u32, age: u32) -> Lifetime {
        Lifetime {
            birth,
            age,
            used_count: 0,
        }
    }

    #[test]
    fn interval_end() {
        assert_eq!(lt(3, 2).end(), 5);
        assert_eq!(lt(7, 0).end(), 7);
    }

    #[test]
    fn overlap_is_symmetric_and_half_open() {
        // [0,2) and [2,4) touch but do not overlap.
        assert!(!lt(0, 2).overlaps(lt(2, 2)));
        assert!(!lt(2, 2).overlaps(lt(0, 2)));
        // [0,3) and [2,4) overlap at step 2.
        assert!(lt(0, 3).overlaps(lt(2, 2)));
        assert!(lt(2, 2).overlaps(lt(0, 3)));
        // Zero-age interval overlaps nothing.
        assert!(!lt(1, 0).overlaps(lt(0, 5)));
    }

    #[test]
    fn aliveness_tracks_used_count() {
        let mut l = lt(0, 0);
        assert!(!l.is_alive());
        l.used_count = 1;
        assert!(l.is_alive());
    }
}
