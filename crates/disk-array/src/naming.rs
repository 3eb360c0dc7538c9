//! Backing file name generation.
//!
//! Names combine the process id with a 64-bit token rendered in hex, e.g.
//! `file_4242_9f1c03b7d2e4a611`. Tokens come from a [`TokenSource`], which is
//! injected through [`StorageOptions`](crate::StorageOptions) so tests can make
//! names deterministic.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

/// Provider of 64-bit tokens used to make backing file names unique.
///
/// Only uniqueness matters; tokens are not required to be unpredictable.
pub trait TokenSource: Send + Sync {
    /// Draws the next token.
    fn next_token(&self) -> u64;
}

/// Tokens drawn from the operating system's entropy via UUID v4.
///
/// Each call is independent, so concurrent construction of arrays from
/// several threads never races on shared generator state.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomTokens;

impl TokenSource for RandomTokens {
    fn next_token(&self) -> u64 {
        let bits = Uuid::new_v4().as_u128();
        // Folding the halves covers the fixed version and variant bits.
        (bits >> 64) as u64 ^ bits as u64
    }
}

/// Deterministic tokens from a seeded splitmix64 sequence.
#[derive(Debug)]
pub struct SeededTokens {
    state: Mutex<u64>,
    seed: u64,
}

impl SeededTokens {
    pub fn new(seed: u64) -> Self {
        Self {
            state: Mutex::new(seed),
            seed,
        }
    }

    /// Returns the seed this source was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Rewinds the sequence to its first token.
    pub fn reset(&self) {
        *self.state.lock() = self.seed;
    }
}

impl TokenSource for SeededTokens {
    fn next_token(&self) -> u64 {
        let mut state = self.state.lock();
        *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = *state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

/// Tokens counting up from a starting value.
#[derive(Debug)]
pub struct SequentialTokens(AtomicU64);

impl SequentialTokens {
    pub fn starting_at(first: u64) -> Self {
        Self(AtomicU64::new(first))
    }
}

impl Default for SequentialTokens {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl TokenSource for SequentialTokens {
    fn next_token(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

/// Produces backing file names for one directory and prefix.
#[derive(Clone)]
pub struct NameGenerator {
    directory: PathBuf,
    prefix: String,
    source: Arc<dyn TokenSource>,
}

impl NameGenerator {
    pub fn new(
        directory: impl Into<PathBuf>,
        prefix: impl Into<String>,
        source: Arc<dyn TokenSource>,
    ) -> Self {
        Self {
            directory: directory.into(),
            prefix: prefix.into(),
            source,
        }
    }

    /// Returns a fresh file name: prefix, process id and a hex token.
    pub fn next_name(&self) -> String {
        format!(
            "{}{}_{:x}",
            self.prefix,
            std::process::id(),
            self.source.next_token()
        )
    }

    /// Resolves a name produced by [`next_name`](Self::next_name) to a path.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.directory.join(name)
    }

    /// Returns a fresh name joined onto the target directory.
    pub fn next_path(&self) -> PathBuf {
        self.path_for(&self.next_name())
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl fmt::Debug for NameGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NameGenerator")
            .field("directory", &self.directory)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn generator(source: impl TokenSource + 'static) -> NameGenerator {
        NameGenerator::new(".", "file_", Arc::new(source))
    }

    #[test]
    fn name_contains_prefix_pid_and_hex_token() {
        let names = generator(SequentialTokens::starting_at(0xabc));
        let name = names.next_name();
        assert_eq!(name, format!("file_{}_abc", std::process::id()));
    }

    #[test]
    fn sequential_names_differ() {
        let names = generator(SequentialTokens::default());
        assert_ne!(names.next_name(), names.next_name());
    }

    #[test]
    fn random_tokens_do_not_repeat() {
        let source = RandomTokens;
        let tokens: HashSet<u64> = (0..1000).map(|_| source.next_token()).collect();
        assert_eq!(tokens.len(), 1000);
    }

    #[test]
    fn seeded_tokens_are_deterministic() {
        let a = SeededTokens::new(7);
        let b = SeededTokens::new(7);
        let first: Vec<u64> = (0..8).map(|_| a.next_token()).collect();
        let second: Vec<u64> = (0..8).map(|_| b.next_token()).collect();
        assert_eq!(first, second);

        a.reset();
        assert_eq!(a.next_token(), first[0]);
        assert_eq!(a.seed(), 7);
    }

    #[test]
    fn seeded_tokens_depend_on_seed() {
        assert_ne!(
            SeededTokens::new(1).next_token(),
            SeededTokens::new(2).next_token()
        );
    }

    #[test]
    fn next_path_joins_directory() {
        let names = NameGenerator::new(
            "/tmp/arrays",
            "scratch_",
            Arc::new(SequentialTokens::starting_at(16)),
        );
        let path = names.next_path();
        assert_eq!(path.parent(), Some(Path::new("/tmp/arrays")));
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some(format!("scratch_{}_10", std::process::id()).as_str())
        );
    }
}
