use serde::{Deserialize, Serialize};

use crate::types::{FortuneError, Result};

/// Header width on disk: five u32 fields, the delimiter byte and three reserved bytes.
pub const HEADER_SIZE: u64 = 24;

/// Width of one offset table record.
pub const OFFSET_ENTRY_SIZE: u64 = 4;

pub const DEFAULT_VERSION: u32 = 2;

/// Versions this reader understands. Version 1 files share the version 2 layout.
pub const SUPPORTED_VERSIONS: [u32; 2] = [1, 2];

/// Bit flags stored in the header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexFlags(u32);

impl IndexFlags {
    /// Offsets are a random permutation of source order.
    pub const RANDOM: IndexFlags = IndexFlags(1);
    /// Offsets are sorted by normalized entry text.
    pub const ORDERED: IndexFlags = IndexFlags(2);
    /// Source text is rot13'd and must be rotated back for display.
    pub const ROTATED: IndexFlags = IndexFlags(4);

    pub const fn empty() -> Self {
        IndexFlags(0)
    }

    pub const fn from_bits(bits: u32) -> Self {
        IndexFlags(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: IndexFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: IndexFlags) {
        self.0 |= other.0;
    }
}

impl std::ops::BitOr for IndexFlags {
    type Output = IndexFlags;

    fn bitor(self, rhs: IndexFlags) -> IndexFlags {
        IndexFlags(self.0 | rhs.0)
    }
}

/// Fixed-size record at offset 0 of every index file.
///
/// Written once after the offset table is known, read-only afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexHeader {
    pub version: u32,
    pub entry_count: u32,
    pub longest_entry_bytes: u32,
    /// `u32::MAX` when `entry_count == 0`.
    pub shortest_entry_bytes: u32,
    pub flags: IndexFlags,
    pub delimiter: u8,
    pub reserved: [u8; 3],
}

impl IndexHeader {
    /// Header for a freshly built index. Only the first byte of `delimiter` is kept.
    pub fn new(
        entry_count: u32,
        longest_entry_bytes: u32,
        shortest_entry_bytes: u32,
        flags: IndexFlags,
        delimiter: &str,
    ) -> Self {
        Self {
            version: DEFAULT_VERSION,
            entry_count,
            longest_entry_bytes,
            shortest_entry_bytes,
            flags,
            delimiter: delimiter.as_bytes().first().copied().unwrap_or(0),
            reserved: [0; 3],
        }
    }

    /// Delimiter recorded in the header, as the line a reader should stop at.
    pub fn delimiter_line(&self) -> Vec<u8> {
        vec![self.delimiter]
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE as usize] {
        let mut buf = [0u8; HEADER_SIZE as usize];
        buf[0..4].copy_from_slice(&self.version.to_be_bytes());
        buf[4..8].copy_from_slice(&self.entry_count.to_be_bytes());
        buf[8..12].copy_from_slice(&self.longest_entry_bytes.to_be_bytes());
        buf[12..16].copy_from_slice(&self.shortest_entry_bytes.to_be_bytes());
        buf[16..20].copy_from_slice(&self.flags.bits().to_be_bytes());
        buf[20] = self.delimiter;
        buf[21..24].copy_from_slice(&self.reserved);
        buf
    }

    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_SIZE as usize {
            return Err(FortuneError::CorruptIndex(format!(
                "header needs {HEADER_SIZE} bytes, found {}",
                buf.len()
            )));
        }

        let word = |at: usize| u32::from_be_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]]);

        let version = word(0);
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(FortuneError::CorruptIndex(format!(
                "unrecognized index version {version}"
            )));
        }

        Ok(Self {
            version,
            entry_count: word(4),
            longest_entry_bytes: word(8),
            shortest_entry_bytes: word(12),
            flags: IndexFlags::from_bits(word(16)),
            delimiter: buf[20],
            reserved: [buf[21], buf[22], buf[23]],
        })
    }
}
