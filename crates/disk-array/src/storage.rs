//! Disk-backed storage for array elements.
//!
//! This module provides the three resources behind an array:
//! - `backing` - the temporary file that owns the bytes on disk
//! - `mapping` - the shared read-write view of that file
//! - `provision` - `Storage<T>`, binding both to an element capacity

mod backing;
mod mapping;
mod provision;

pub(crate) use provision::{byte_len, Storage};
