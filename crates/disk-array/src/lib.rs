//! Growable arrays whose element storage lives in memory-mapped temporary files.
//!
//! This crate provides:
//! - `DiskArray<T>`, a vector-like sequence backed by a shared file mapping
//! - Pluggable file naming and capacity growth through `StorageOptions`
//!
//! ```no_run
//! use disk_array::DiskArray;
//!
//! # fn main() -> disk_array::Result<()> {
//! let mut samples = DiskArray::from_elem(3, 7u32)?;
//! samples.push(9)?;
//! assert_eq!(samples.as_slice(), &[7, 7, 7, 9]);
//! assert_eq!(samples.capacity(), 7);
//! # Ok(())
//! # }
//! ```
//!
//! Backing files are scratch space for one array in one process. They are
//! deleted when the array is cleared or dropped and are not a storage format.
//!
//! Unix only: growing an array unlinks its old file while that file is still
//! mapped.

#[cfg(not(unix))]
compile_error!("disk-array requires a Unix platform");

pub mod array;
pub mod element;
pub mod error;
pub mod growth;
pub mod naming;
pub mod options;
mod storage;

// Re-export main types
pub use array::DiskArray;
pub use element::Element;
pub use error::{DiskArrayError, Result};
pub use growth::{max_elements, DoublingGrowth, GrowthPolicy};
pub use naming::{NameGenerator, RandomTokens, SeededTokens, SequentialTokens, TokenSource};
pub use options::StorageOptions;

#[cfg(feature = "serde")]
pub use array::DiskArraySeed;
