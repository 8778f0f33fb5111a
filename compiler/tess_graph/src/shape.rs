//! Tensor shapes and dimension bookkeeping.

use std::fmt;

use smallvec::SmallVec;

use crate::DType;

/// Logical dimensions of a tensor value.
///
/// Stored inline for rank ≤ 4 (`SmallVec`), which covers essentially every
/// shape a vision/NLP graph produces. Rank 0 is a scalar with one element.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Shape(SmallVec<[usize; 4]>);

impl Shape {
    /// Construct a shape from a dimension slice.
    pub fn new(dims: &[usize]) -> Self {
        Self(SmallVec::from_slice(dims))
    }

    /// The rank-0 scalar shape.
    pub fn scalar() -> Self {
        Self(SmallVec::new())
    }

    /// Borrow the raw dimension slice.
    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    /// Number of axes.
    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Total number of elements implied by the shape.
    ///
    /// The empty product makes a scalar hold exactly one element.
    pub fn num_elements(&self) -> usize {
        self.0.iter().product()
    }

    /// Byte size of a dense buffer holding this shape at the given dtype.
    pub fn size_in_bytes(&self, dtype: DType) -> usize {
        self.num_elements() * dtype.size_in_bytes()
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self::new(dims)
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Self::new(&dims)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("scalar");
        }
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("x")?;
            }
            write!(f, "{d}")?;
        }
        Ok(())
    }
}
