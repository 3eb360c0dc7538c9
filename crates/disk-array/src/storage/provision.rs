//! Provisioning of mapped element storage.

use std::fmt;
use std::fs::File;
use std::marker::PhantomData;
use std::mem;
use std::path::{Path, PathBuf};
use std::slice;

use super::backing::BackingFile;
use super::mapping::Mapping;
use crate::element::Element;
use crate::error::{DiskArrayError, Result};
use crate::growth::max_elements;

/// A backing file and its mapping, sized for exactly `capacity` elements.
///
/// Dropping the storage unmaps the file and then deletes it.
pub(crate) struct Storage<T> {
    // Field order matters: the mapping is released before the file is removed.
    mapping: Mapping,
    file: BackingFile,
    capacity: usize,
    _marker: PhantomData<T>,
}

impl<T: Element> Storage<T> {
    /// Creates, sizes and maps a file at `path` holding `capacity` elements.
    ///
    /// Any file already at `path` is truncated. On failure nothing is left
    /// behind on disk.
    pub(crate) fn provision(path: PathBuf, capacity: usize) -> Result<Self> {
        Self::provision_with(path, capacity, Mapping::map)
    }

    /// Provisions like [`provision`](Self::provision), establishing the
    /// mapping with `map`.
    fn provision_with<M>(path: PathBuf, capacity: usize, map: M) -> Result<Self>
    where
        M: FnOnce(&File, &Path, usize) -> Result<Mapping>,
    {
        debug_assert!(capacity > 0, "zero capacity is never provisioned");
        let bytes = byte_len::<T>(capacity)?;
        let (file, handle) = BackingFile::create(path, bytes as u64)?;
        // On failure `file` is dropped here, which removes it from disk.
        let mapping = map(&handle, file.path(), bytes)?;
        // The mapping keeps the pages alive on its own.
        drop(handle);
        debug_assert_eq!(mapping.len() as u64, file.bytes());

        log::debug!(
            "provisioned {} ({} elements, {} bytes)",
            file.path().display(),
            capacity,
            bytes
        );
        Ok(Self {
            mapping,
            file,
            capacity,
            _marker: PhantomData,
        })
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn path(&self) -> &Path {
        self.file.path()
    }

    /// Detaches the file from its path so a new file can take the same name.
    ///
    /// The contents stay reachable through the mapping until it is dropped.
    pub(crate) fn unlink(&mut self) -> Result<()> {
        self.file
            .unlink()
            .map_err(|source| DiskArrayError::Remove {
                path: self.file.path().to_path_buf(),
                source,
            })
    }

    pub(crate) fn as_ptr(&self) -> *const T {
        self.mapping.as_ptr().cast()
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut T {
        self.mapping.as_mut_ptr().cast()
    }

    /// Views the first `len` elements.
    pub(crate) fn slice(&self, len: usize) -> &[T] {
        assert!(len <= self.capacity);
        // SAFETY: the mapping holds `capacity` elements, is page aligned and
        // `Element` accepts any byte pattern.
        unsafe { slice::from_raw_parts(self.as_ptr(), len) }
    }

    /// Mutably views the first `len` elements.
    pub(crate) fn slice_mut(&mut self, len: usize) -> &mut [T] {
        assert!(len <= self.capacity);
        // SAFETY: as in `slice`, and `&mut self` guarantees exclusivity.
        unsafe { slice::from_raw_parts_mut(self.as_mut_ptr(), len) }
    }

    /// Views the whole capacity.
    pub(crate) fn all_mut(&mut self) -> &mut [T] {
        self.slice_mut(self.capacity)
    }
}

impl<T> Drop for Storage<T> {
    fn drop(&mut self) {
        log::debug!(
            "releasing {} ({} elements)",
            self.file.path().display(),
            self.capacity
        );
    }
}

impl<T> fmt::Debug for Storage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage")
            .field("path", &self.file.path())
            .field("capacity", &self.capacity)
            .finish()
    }
}

/// Byte size of `capacity` elements, if it fits in a mapping.
pub(crate) fn byte_len<T>(capacity: usize) -> Result<usize> {
    let max = max_elements::<T>();
    if capacity > max {
        return Err(DiskArrayError::CapacityOverflow {
            requested: capacity,
            max,
        });
    }
    Ok(capacity * mem::size_of::<T>())
}
