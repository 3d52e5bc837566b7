use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};

use crate::index::{IndexFile, IndexFlags};
use crate::strfile::{rot13, trim_line_ending};
use crate::tree::FileSystemNode;
use crate::types::{FortuneError, FortuneRecord, Result};

/// Open handles on one leaf: its index and its source text.
///
/// Both handles close when the reader is dropped, on success or error.
#[derive(Debug)]
pub struct LeafReader {
    file_name: String,
    index: IndexFile,
    source: BufReader<File>,
    delimiter: Vec<u8>,
    rotated: bool,
}

impl LeafReader {
    pub fn open(node: &FileSystemNode) -> Result<Self> {
        let index_path = node
            .index_path
            .as_deref()
            .ok_or_else(|| FortuneError::MissingIndex(node.path.clone()))?;
        let index = IndexFile::open(index_path)?;
        let source = File::open(&node.path).map_err(|e| FortuneError::SourceUnreadable {
            path: node.path.clone(),
            source: e,
        })?;

        Ok(Self {
            file_name: node.file_name(),
            delimiter: index.header.delimiter_line(),
            rotated: index.header.flags.contains(IndexFlags::ROTATED),
            index,
            source: BufReader::new(source),
        })
    }

    pub fn entry_count(&self) -> u32 {
        self.index.header.entry_count
    }

    /// Bytes of the entry at 0-based `index`, un-rotated but not yet decoded.
    /// Their length is the one recorded in the index header.
    pub fn entry_bytes(&mut self, index: u32) -> Result<Vec<u8>> {
        let offset = self.index.offset(index)?;
        let raw = read_entry(&mut self.source, u64::from(offset), &self.delimiter)?;
        Ok(if self.rotated { rot13(&raw) } else { raw })
    }

    /// Decode the entry at 0-based `index`, reading only that entry's bytes.
    /// Invalid UTF-8 is replaced, so `text.len()` may exceed the stored length.
    pub fn record(&mut self, index: u32) -> Result<FortuneRecord> {
        let raw = self.entry_bytes(index)?;
        Ok(self.to_record(&raw))
    }

    pub fn to_record(&self, raw: &[u8]) -> FortuneRecord {
        FortuneRecord::new(self.file_name.clone(), String::from_utf8_lossy(raw).into_owned())
    }
}

/// Bytes from `offset` up to, not including, the next delimiter line or EOF.
pub fn read_entry<R: BufRead + Seek>(source: &mut R, offset: u64, delimiter: &[u8]) -> Result<Vec<u8>> {
    source.seek(SeekFrom::Start(offset))?;

    let mut entry = Vec::new();
    let mut line = Vec::new();
    loop {
        line.clear();
        if source.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        if trim_line_ending(&line) == delimiter {
            break;
        }
        entry.extend_from_slice(&line);
    }
    Ok(entry)
}
