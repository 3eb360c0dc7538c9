//! Shared read-write mappings over backing files.

use std::fs::File;
use std::path::Path;

use memmap2::{MmapMut, MmapOptions};

use crate::error::{DiskArrayError, Result};

/// Memory-mapped view of a whole backing file.
#[derive(Debug)]
pub(crate) struct Mapping {
    map: MmapMut,
}

impl Mapping {
    /// Maps the first `bytes` bytes of `file` shared and writable.
    pub(crate) fn map(file: &File, path: &Path, bytes: usize) -> Result<Self> {
        // SAFETY: the file was created by this process under a unique name
        // and nothing else resizes or writes it while the mapping lives.
        let map = unsafe { MmapOptions::new().len(bytes).map_mut(file) }.map_err(|source| {
            DiskArrayError::Map {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Ok(Self { map })
    }

    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }

    pub(crate) fn as_ptr(&self) -> *const u8 {
        self.map.as_ptr()
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut u8 {
        self.map.as_mut_ptr()
    }
}
