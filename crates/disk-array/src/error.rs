use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DiskArrayError {
    #[error("failed to open backing file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to size backing file {path} to {bytes} bytes: {source}")]
    Size {
        path: PathBuf,
        bytes: u64,
        #[source]
        source: io::Error,
    },

    #[error("failed to map backing file {path}: {source}")]
    Map {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove backing file {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("index {index} out of bounds for length {len}")]
    Index { index: usize, len: usize },

    #[error("capacity of {requested} elements exceeds the maximum of {max}")]
    CapacityOverflow { requested: usize, max: usize },
}

impl DiskArrayError {
    /// Returns true for failures of the file system or mapping calls.
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            Self::Open { .. } | Self::Size { .. } | Self::Map { .. } | Self::Remove { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DiskArrayError>;
