//! Growable array stored in a memory-mapped temporary file.
//!
//! `DiskArray<T>` behaves like a `Vec<T>` for fixed-layout element types, but
//! its storage is a shared mapping over a file in the configured directory
//! (the working directory by default). The OS can page that file in and out
//! like any other, so very large arrays do not pin process memory.
//!
//! ## Storage lifecycle
//!
//! - An empty array owns no file. The first operation that needs capacity
//!   draws a name from the [`NameGenerator`](crate::NameGenerator) and keeps
//!   it for the lifetime of the array.
//! - Growing past capacity provisions a new file under the same name, copies
//!   the live elements across and releases the old mapping.
//! - [`clear`](DiskArray::clear) and dropping the array delete the file.
//!   After `clear` the next allocation draws a fresh name.

mod ordering;
#[cfg(feature = "serde")]
mod serialize;

#[cfg(feature = "serde")]
pub use serialize::DiskArraySeed;

use std::fmt;
use std::ops::{Deref, DerefMut, Index, IndexMut};
use std::path::{Path, PathBuf};
use std::ptr;

use crate::element::Element;
use crate::error::{DiskArrayError, Result};
use crate::growth::max_elements;
use crate::options::StorageOptions;
use crate::storage::{byte_len, Storage};

/// Growable, randomly indexable sequence backed by a mapped temporary file.
pub struct DiskArray<T> {
    /// Logical element count.
    len: usize,

    /// Current file and mapping; `None` while capacity is zero.
    storage: Option<Storage<T>>,

    /// File name kept across reallocations.
    name: Option<String>,

    options: StorageOptions,
}

impl<T: Element> DiskArray<T> {
    const NOT_ZERO_SIZED: () = assert!(
        std::mem::size_of::<T>() != 0,
        "zero-sized types cannot be stored in a DiskArray"
    );

    /// Creates an empty array with default options. No file is created.
    pub fn new() -> Self {
        Self::with_options(StorageOptions::default())
    }

    /// Creates an empty array that will store its file according to `options`.
    pub fn with_options(options: StorageOptions) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NOT_ZERO_SIZED;
        Self {
            len: 0,
            storage: None,
            name: None,
            options,
        }
    }

    /// Creates an array of `len` elements with capacity `len`.
    ///
    /// Elements of a freshly sized file read as all-zero bytes.
    pub fn with_len(len: usize) -> Result<Self> {
        Self::with_len_in(len, StorageOptions::default())
    }

    /// Like [`with_len`](Self::with_len), storing the file according to `options`.
    pub fn with_len_in(len: usize, options: StorageOptions) -> Result<Self> {
        let mut array = Self::with_options(options);
        array.resize(len)?;
        Ok(array)
    }

    /// Creates an array of `len` copies of `value`.
    pub fn from_elem(len: usize, value: T) -> Result<Self> {
        Self::from_elem_with_capacity(len, value, len)
    }

    /// Creates an array of `len` copies of `value` with room for `capacity`.
    ///
    /// Returns an [`Index`](DiskArrayError::Index) error if `len > capacity`.
    pub fn from_elem_with_capacity(len: usize, value: T, capacity: usize) -> Result<Self> {
        Self::from_elem_with_capacity_in(len, value, capacity, StorageOptions::default())
    }

    /// Like [`from_elem_with_capacity`](Self::from_elem_with_capacity), storing
    /// the file according to `options`.
    pub fn from_elem_with_capacity_in(
        len: usize,
        value: T,
        capacity: usize,
        options: StorageOptions,
    ) -> Result<Self> {
        if len > capacity {
            return Err(DiskArrayError::Index {
                index: len,
                len: capacity,
            });
        }
        let mut array = Self::with_options(options);
        array.ensure_capacity(capacity)?;
        array.len = len;
        array.as_mut_slice().fill(value);
        Ok(array)
    }

    /// Creates an array holding a copy of `values`, with capacity `values.len()`.
    pub fn from_slice(values: &[T]) -> Result<Self> {
        Self::from_slice_with_capacity(values, values.len())
    }

    /// Creates an array holding a copy of `values` with room for `capacity`.
    pub fn from_slice_with_capacity(values: &[T], capacity: usize) -> Result<Self> {
        Self::from_slice_with_capacity_in(values, capacity, StorageOptions::default())
    }

    /// Like [`from_slice_with_capacity`](Self::from_slice_with_capacity),
    /// storing the file according to `options`.
    pub fn from_slice_with_capacity_in(
        values: &[T],
        capacity: usize,
        options: StorageOptions,
    ) -> Result<Self> {
        if values.len() > capacity {
            return Err(DiskArrayError::Index {
                index: values.len(),
                len: capacity,
            });
        }
        let mut array = Self::with_options(options);
        array.ensure_capacity(capacity)?;
        array.len = values.len();
        array.as_mut_slice().copy_from_slice(values);
        Ok(array)
    }

    /// Copies this array into independent storage with its own file name.
    ///
    /// The copy keeps the same length and capacity.
    pub fn try_clone(&self) -> Result<Self> {
        let mut copy = Self::with_options(self.options.clone());
        if self.capacity() > 0 {
            copy.reallocate(self.capacity(), 0)?;
            copy.len = self.len;
            copy.as_mut_slice().copy_from_slice(self.as_slice());
        }
        Ok(copy)
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Number of elements the current file can hold without reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.as_ref().map_or(0, Storage::capacity)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Largest capacity whose byte size fits in a single mapping.
    pub fn max_size(&self) -> usize {
        max_elements::<T>()
    }

    /// Name of the backing file, once one has been assigned.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Path of the current backing file, if storage is allocated.
    pub fn path(&self) -> Option<&Path> {
        self.storage.as_ref().map(Storage::path)
    }

    pub fn options(&self) -> &StorageOptions {
        &self.options
    }

    pub fn as_slice(&self) -> &[T] {
        match &self.storage {
            Some(storage) => storage.slice(self.len),
            None => &[],
        }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        match &mut self.storage {
            Some(storage) => storage.slice_mut(self.len),
            None => &mut [],
        }
    }

    /// Checked access: fails with [`DiskArrayError::Index`] when `index >= len`.
    pub fn at(&self, index: usize) -> Result<&T> {
        let len = self.len;
        self.as_slice()
            .get(index)
            .ok_or(DiskArrayError::Index { index, len })
    }

    /// Checked mutable access: fails with [`DiskArrayError::Index`] when `index >= len`.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.len;
        self.as_mut_slice()
            .get_mut(index)
            .ok_or(DiskArrayError::Index { index, len })
    }

    /// Returns the slot at `index` without any bounds check.
    ///
    /// Slots in `[len, capacity)` hold unspecified but valid values.
    ///
    /// # Safety
    ///
    /// `index` must be below [`capacity`](Self::capacity).
    #[inline]
    pub unsafe fn slot_unchecked(&self, index: usize) -> &T {
        let storage = self.storage.as_ref().unwrap_unchecked();
        &*storage.as_ptr().add(index)
    }

    /// Mutable counterpart of [`slot_unchecked`](Self::slot_unchecked).
    ///
    /// # Safety
    ///
    /// `index` must be below [`capacity`](Self::capacity).
    #[inline]
    pub unsafe fn slot_unchecked_mut(&mut self, index: usize) -> &mut T {
        let storage = self.storage.as_mut().unwrap_unchecked();
        &mut *storage.as_mut_ptr().add(index)
    }

    // ---------------------------------------------------------------------
    // Capacity management
    // ---------------------------------------------------------------------

    /// Sets the logical length to `new_len`.
    ///
    /// Within capacity only the length changes; newly exposed elements keep
    /// whatever the file held. Past capacity the array is reallocated to
    /// exactly `new_len` elements and the previous elements are copied over.
    pub fn resize(&mut self, new_len: usize) -> Result<()> {
        if new_len > self.capacity() {
            self.reallocate(new_len, self.len)?;
        } else {
            log::trace!("resize {} -> {} within capacity", self.len, new_len);
        }
        self.len = new_len;
        Ok(())
    }

    /// Makes sure at least `min_capacity` elements fit, without changing length.
    pub fn ensure_capacity(&mut self, min_capacity: usize) -> Result<()> {
        if min_capacity <= self.capacity() {
            return Ok(());
        }
        self.reallocate(min_capacity, self.len)
    }

    /// Grows capacity by the configured growth policy.
    pub fn grow(&mut self) -> Result<()> {
        let current = self.capacity();
        let max = max_elements::<T>();
        let next = self.options.growth().next_capacity(current, max);
        if next <= current || next > max {
            return Err(DiskArrayError::CapacityOverflow {
                requested: current.saturating_add(1),
                max,
            });
        }
        self.reallocate(next, self.len)
    }

    /// Shrinks capacity to the current length.
    ///
    /// Trimming an empty array releases its file but keeps its name.
    pub fn trim(&mut self) -> Result<()> {
        if self.capacity() == self.len {
            return Ok(());
        }
        if self.len == 0 {
            self.storage = None;
            return Ok(());
        }
        self.reallocate(self.len, self.len)
    }

    /// Releases the file and mapping and forgets the file name.
    pub fn clear(&mut self) {
        self.storage = None;
        self.len = 0;
        self.name = None;
    }

    /// Exchanges contents with `other` by swapping storage ownership.
    ///
    /// No element is copied; each array takes over the other's file and name.
    pub fn swap_with(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    /// Moves storage to a new file of `capacity` elements, keeping the first
    /// `keep` elements.
    fn reallocate(&mut self, capacity: usize, keep: usize) -> Result<()> {
        // Reject impossible sizes while the current file is still in place.
        byte_len::<T>(capacity)?;
        let path = self.backing_path();
        // The new file takes the same name, so the old one gives up its path
        // first; its pages live on through the mapping until we copy out.
        if let Some(old) = self.storage.as_mut() {
            old.unlink()?;
        }
        let mut fresh = Storage::provision(path, capacity)?;
        if let Some(old) = self.storage.take() {
            let keep = keep.min(old.capacity()).min(capacity);
            fresh.slice_mut(keep).copy_from_slice(old.slice(keep));
        }
        self.storage = Some(fresh);
        Ok(())
    }

    /// Path for the next provision, naming the array on first use.
    fn backing_path(&mut self) -> PathBuf {
        let names = self.options.names();
        let name = self.name.get_or_insert_with(|| names.next_name());
        names.path_for(name)
    }

    // ---------------------------------------------------------------------
    // Structural mutation
    // ---------------------------------------------------------------------

    /// Appends `value`, growing the file when full.
    pub fn push(&mut self, value: T) -> Result<()> {
        if self.len == self.capacity() {
            self.grow()?;
        }
        // SAFETY: len < capacity after growing.
        unsafe { *self.slot_unchecked_mut(self.len) = value };
        self.len += 1;
        Ok(())
    }

    /// Removes the last element. Its slot keeps the value until overwritten.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the slot was part of the array a moment ago.
        Some(unsafe { *self.slot_unchecked(self.len) })
    }

    /// Inserts `value` at `index`, shifting later elements right.
    ///
    /// `index == len` appends. Fails with an index error if `index > len`.
    pub fn insert(&mut self, index: usize, value: T) -> Result<()> {
        if index > self.len {
            return Err(DiskArrayError::Index {
                index,
                len: self.len,
            });
        }
        if self.len == 0 {
            return self.push(value);
        }
        // Duplicate the last element to make room, then shift the rest.
        let last = self.as_slice()[self.len - 1];
        self.push(last)?;
        let len = self.len;
        let elements = self.as_mut_slice();
        elements.copy_within(index..len - 1, index + 1);
        elements[index] = value;
        Ok(())
    }

    /// Removes and returns the element at `index`, shifting later elements left.
    pub fn remove(&mut self, index: usize) -> Result<T> {
        let len = self.len;
        let elements = self.as_mut_slice();
        let Some(&value) = elements.get(index) else {
            return Err(DiskArrayError::Index { index, len });
        };
        elements.copy_within(index + 1..len, index);
        self.len -= 1;
        Ok(value)
    }

    /// Appends `value` unless an equal element is already present.
    ///
    /// Returns whether the value was appended.
    pub fn add_unique(&mut self, value: T) -> Result<bool>
    where
        T: PartialEq,
    {
        if self.as_slice().contains(&value) {
            return Ok(false);
        }
        self.push(value)?;
        Ok(true)
    }

    /// Appends all of `values`, growing at most once.
    pub fn extend_from_slice(&mut self, values: &[T]) -> Result<()> {
        let needed = self
            .len
            .checked_add(values.len())
            .ok_or(DiskArrayError::CapacityOverflow {
                requested: usize::MAX,
                max: max_elements::<T>(),
            })?;
        if needed > self.capacity() {
            let grown = self
                .options
                .growth()
                .next_capacity(self.capacity(), max_elements::<T>());
            self.reallocate(needed.max(grown), self.len)?;
        }
        let start = self.len;
        self.len = needed;
        self.as_mut_slice()[start..].copy_from_slice(values);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Assignment
    // ---------------------------------------------------------------------

    /// Replaces the contents with the items of `iter`.
    pub fn assign_iter<I>(&mut self, iter: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let iter = iter.into_iter();
        self.resize(iter.len())?;
        for (slot, value) in self.as_mut_slice().iter_mut().zip(iter) {
            *slot = value;
        }
        Ok(())
    }

    /// Replaces the contents with `count` copies of `value`.
    pub fn assign_fill(&mut self, count: usize, value: T) -> Result<()> {
        self.resize(count)?;
        self.as_mut_slice().fill(value);
        Ok(())
    }

    /// Replaces the contents with a copy of `values`.
    ///
    /// Capacity only changes when `values` does not fit.
    pub fn assign_slice(&mut self, values: &[T]) -> Result<()> {
        if values.len() > self.capacity() {
            // Old contents are overwritten, so nothing needs migrating.
            self.reallocate(values.len(), 0)?;
        }
        self.len = values.len();
        self.as_mut_slice().copy_from_slice(values);
        Ok(())
    }

    /// Replaces the contents with a copy of `other`'s elements.
    pub fn assign_from(&mut self, other: &Self) -> Result<()> {
        self.assign_slice(other.as_slice())
    }

    /// Overwrites every element with zero bytes.
    pub fn set_zero(&mut self) {
        let elements = self.as_mut_slice();
        // SAFETY: `Element` types accept the all-zero byte pattern.
        unsafe { ptr::write_bytes(elements.as_mut_ptr(), 0, elements.len()) };
    }
}

impl<T: Element> Default for DiskArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Element> Clone for DiskArray<T> {
    /// # Panics
    ///
    /// Panics if the copy's backing file cannot be provisioned. Use
    /// [`DiskArray::try_clone`] to handle that case.
    fn clone(&self) -> Self {
        self.try_clone()
            .expect("DiskArray::clone failed to provision backing storage")
    }

    fn clone_from(&mut self, source: &Self) {
        self.assign_from(source)
            .expect("DiskArray::clone_from failed to provision backing storage")
    }
}

impl<T: Element> Deref for DiskArray<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T: Element> DerefMut for DiskArray<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: Element> Index<usize> for DiskArray<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.at(index) {
            Ok(value) => value,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T: Element> IndexMut<usize> for DiskArray<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        match self.at_mut(index) {
            Ok(value) => value,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<'a, T: Element> IntoIterator for &'a DiskArray<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<'a, T: Element> IntoIterator for &'a mut DiskArray<T> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_mut_slice().iter_mut()
    }
}

impl<T: Element + fmt::Debug> fmt::Debug for DiskArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
