//! Per-array storage settings.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::growth::{DoublingGrowth, GrowthPolicy};
use crate::naming::{NameGenerator, RandomTokens, TokenSource};

/// Default prefix for backing file names.
pub const DEFAULT_PREFIX: &str = "file_";

/// Where backing files go, how they are named, and how arrays grow.
///
/// Cloning is cheap; clones of an array share their options.
#[derive(Clone)]
pub struct StorageOptions {
    directory: PathBuf,
    prefix: String,
    token_source: Arc<dyn TokenSource>,
    growth_policy: Arc<dyn GrowthPolicy>,
}

impl Default for StorageOptions {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            prefix: DEFAULT_PREFIX.to_string(),
            token_source: Arc::new(RandomTokens),
            growth_policy: Arc::new(DoublingGrowth),
        }
    }
}

impl StorageOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory backing files are created in. Defaults to the working directory.
    pub fn directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn token_source(mut self, source: Arc<dyn TokenSource>) -> Self {
        self.token_source = source;
        self
    }

    pub fn growth_policy(mut self, policy: Arc<dyn GrowthPolicy>) -> Self {
        self.growth_policy = policy;
        self
    }

    pub fn get_directory(&self) -> &Path {
        &self.directory
    }

    pub fn get_prefix(&self) -> &str {
        &self.prefix
    }

    pub(crate) fn growth(&self) -> &dyn GrowthPolicy {
        self.growth_policy.as_ref()
    }

    pub(crate) fn names(&self) -> NameGenerator {
        NameGenerator::new(
            self.directory.clone(),
            self.prefix.clone(),
            Arc::clone(&self.token_source),
        )
    }
}

impl fmt::Debug for StorageOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageOptions")
            .field("directory", &self.directory)
            .field("prefix", &self.prefix)
            .field("growth_policy", &self.growth_policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::SequentialTokens;

    #[test]
    fn defaults_use_working_directory() {
        let options = StorageOptions::default();
        assert_eq!(options.get_directory(), Path::new("."));
        assert_eq!(options.get_prefix(), "file_");
        assert_eq!(options.growth().next_capacity(3, usize::MAX), 7);
    }

    #[test]
    fn builder_overrides_naming() {
        let options = StorageOptions::new()
            .directory("/var/tmp")
            .prefix("grid_")
            .token_source(Arc::new(SequentialTokens::starting_at(255)));
        let path = options.names().next_path();
        assert_eq!(
            path,
            Path::new("/var/tmp").join(format!("grid_{}_ff", std::process::id()))
        );
    }
}
