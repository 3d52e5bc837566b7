use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::index::IndexFlags;
use crate::types::{FortuneError, Result};

pub const DEFAULT_DELIMITER: &str = "%";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrfileConfig {
    pub delimiter: String,
    pub ignore_case: bool,
    pub rotate13: bool,
    pub order: bool,
    pub randomize: bool,
}

impl Default for StrfileConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.into(),
            ignore_case: false,
            rotate13: false,
            order: false,
            randomize: false,
        }
    }
}

impl StrfileConfig {
    /// The header records a single delimiter byte, so the delimiter must be
    /// exactly one byte that is not a line ending.
    pub fn validate(&self) -> Result<()> {
        if self.delimiter.len() != 1 || self.delimiter.contains(['\n', '\r']) {
            return Err(FortuneError::InvalidDelimiter(self.delimiter.clone()));
        }
        Ok(())
    }

    /// Entries must be buffered before writing when they get reordered.
    pub fn buffers_entries(&self) -> bool {
        self.order || self.randomize
    }

    /// Ordering wins when both `order` and `randomize` are requested, so at
    /// most one of ORDERED and RANDOM is ever set.
    pub fn flags(&self) -> IndexFlags {
        let mut flags = IndexFlags::empty();
        if self.order {
            flags.insert(IndexFlags::ORDERED);
        } else if self.randomize {
            flags.insert(IndexFlags::RANDOM);
        }
        if self.rotate13 {
            flags.insert(IndexFlags::ROTATED);
        }
        flags
    }
}

/// Final statistics of one build, handed to the summary observer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrfileStats {
    pub index_path: PathBuf,
    pub entry_count: u32,
    pub longest_entry_bytes: u32,
    pub shortest_entry_bytes: u32,
    pub flags: IndexFlags,
}

impl StrfileStats {
    /// Human-readable report in the classic strfile wording.
    pub fn summary(&self) -> String {
        let mut out = format!("\"{}\" created\n", self.index_path.display());
        match self.entry_count {
            0 => {
                out.push_str("There was no string\n");
                return out;
            }
            1 => out.push_str("There was 1 string\n"),
            n => out.push_str(&format!("There were {n} strings\n")),
        }
        out.push_str(&format!("Longest string: {} bytes\n", self.longest_entry_bytes));
        out.push_str(&format!("Shortest string: {} bytes\n", self.shortest_entry_bytes));
        out
    }
}
