pub mod decode;
pub mod matching;
pub mod sampling;

use log::debug;
use rand::rngs::StdRng;
use rand::Rng;

use crate::tree::FileSystemNode;
use crate::types::{FortuneError, FortuneRecord, Result};
pub use decode::{read_entry, LeafReader};
pub use matching::{matching_fortunes, MatchingFortunes};
pub use sampling::{reachable_leaves, sample_leaf, time_seeded_rng};

/// Upper bound on rejection-sampling rounds for the length filter.
pub const DEFAULT_MAX_ATTEMPTS: usize = 10_000;

/// Weighted random retrieval over a built and weighted tree.
///
/// Owns its random source, so tests can hand in a seeded generator.
pub struct FortuneSelector<R> {
    rng: R,
    max_attempts: usize,
}

impl Default for FortuneSelector<StdRng> {
    fn default() -> Self {
        Self::new(time_seeded_rng())
    }
}

impl<R: Rng> FortuneSelector<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn sample_leaf<'a>(&mut self, root: &'a FileSystemNode) -> Result<&'a FileSystemNode> {
        sample_leaf(root, &mut self.rng)
    }

    pub fn random_fortune(&mut self, root: &FileSystemNode) -> Result<FortuneRecord> {
        let (reader, raw) = self.random_entry(root)?;
        Ok(reader.to_record(&raw))
    }

    fn random_entry(&mut self, root: &FileSystemNode) -> Result<(LeafReader, Vec<u8>)> {
        let leaf = self.sample_leaf(root)?;
        let index = self.rng.random_range(0..leaf.num_entries);
        debug!("entry {index} of {} from {}", leaf.num_entries, leaf.path.display());
        let mut reader = LeafReader::open(leaf)?;
        let raw = reader.entry_bytes(index)?;
        Ok((reader, raw))
    }

    /// Random fortune whose byte length lies strictly between `longer_than`
    /// and `shorter_than`.
    ///
    /// Fails fast when no reachable file's recorded length range overlaps the
    /// bounds, and gives up after the attempt limit otherwise.
    pub fn length_filtered_random_fortune(
        &mut self,
        root: &FileSystemNode,
        shorter_than: u32,
        longer_than: u32,
    ) -> Result<FortuneRecord> {
        let fits = |len: u64| len > u64::from(longer_than) && len < u64::from(shorter_than);

        let feasible = reachable_leaves(root).into_iter().any(|leaf| match &leaf.header {
            Some(h) => h.longest_entry_bytes > longer_than && h.shortest_entry_bytes < shorter_than,
            None => false,
        });
        if !feasible {
            return Err(FortuneError::EmptyCorpus(format!(
                "no fortune is longer than {longer_than} and shorter than {shorter_than} bytes"
            )));
        }

        // Lengths are compared on the source bytes, as the header records them.
        for _ in 0..self.max_attempts {
            let (reader, raw) = self.random_entry(root)?;
            if fits(raw.len() as u64) {
                return Ok(reader.to_record(&raw));
            }
        }

        Err(FortuneError::EmptyCorpus(format!(
            "no fortune between {longer_than} and {shorter_than} bytes after {} attempts",
            self.max_attempts
        )))
    }
}
