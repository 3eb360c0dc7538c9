//! Capacity growth policies for implicit growth on append.

use std::fmt;
use std::mem;

/// Largest element count whose byte size fits in a mapping.
///
/// Slices are limited to `isize::MAX` bytes, so that is the ceiling rather
/// than `usize::MAX`.
pub const fn max_elements<T>() -> usize {
    let size = mem::size_of::<T>();
    if size == 0 {
        usize::MAX
    } else {
        isize::MAX as usize / size
    }
}

/// Decides the next capacity when an append finds the array full.
pub trait GrowthPolicy: Send + Sync + fmt::Debug {
    /// Returns the capacity to grow to from `current`, never above `max`.
    ///
    /// Returning a value `<= current` means the array cannot grow.
    fn next_capacity(&self, current: usize, max: usize) -> usize;
}

/// `2 * capacity + 1`, saturating at the largest representable capacity.
#[derive(Debug, Default, Clone, Copy)]
pub struct DoublingGrowth;

impl GrowthPolicy for DoublingGrowth {
    fn next_capacity(&self, current: usize, max: usize) -> usize {
        if current < max / 2 {
            2 * current + 1
        } else {
            max
        }
    }
}
