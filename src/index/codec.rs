use std::fs::File;
use std::io::{self, BufReader, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::index::header::{IndexHeader, HEADER_SIZE, OFFSET_ENTRY_SIZE};
use crate::types::{FortuneError, Result};

// All multi-byte fields are big-endian.

/// Serialize `header` at byte 0, overwriting whatever is there.
pub fn write_header<W: Write + Seek>(out: &mut W, header: &IndexHeader) -> Result<()> {
    out.seek(SeekFrom::Start(0))?;
    out.write_all(&header.to_bytes())?;
    Ok(())
}

pub fn read_header<R: Read + Seek>(input: &mut R) -> Result<IndexHeader> {
    input.seek(SeekFrom::Start(0))?;
    let mut buf = [0u8; HEADER_SIZE as usize];
    read_exact_or_corrupt(input, &mut buf, "header")?;
    IndexHeader::from_bytes(&buf)
}

/// Byte position of the 1-based `ordinal` in a table with records `entry_size` apart.
pub fn entry_position(entry_size: u64, ordinal: u32) -> Result<u64> {
    if ordinal == 0 {
        return Err(FortuneError::Io(io::Error::new(
            ErrorKind::InvalidInput,
            "offset ordinals start at 1",
        )));
    }
    check_entry_size(entry_size)?;
    Ok(HEADER_SIZE + u64::from(ordinal - 1) * entry_size)
}

pub fn write_offset_entry<W: Write + Seek>(
    out: &mut W,
    entry_size: u64,
    ordinal: u32,
    offset: u32,
) -> Result<()> {
    let position = entry_position(entry_size, ordinal)?;
    out.seek(SeekFrom::Start(position))?;
    out.write_all(&offset.to_be_bytes())?;
    Ok(())
}

/// Write the next record of a table being filled in order, at the current
/// position, padded to `entry_size`.
pub fn append_offset_entry<W: Write>(out: &mut W, entry_size: u64, offset: u32) -> Result<()> {
    check_entry_size(entry_size)?;
    out.write_all(&offset.to_be_bytes())?;
    let padding = (entry_size - OFFSET_ENTRY_SIZE) as usize;
    if padding > 0 {
        out.write_all(&vec![0u8; padding])?;
    }
    Ok(())
}

pub fn read_offset_entry<R: Read + Seek>(input: &mut R, entry_size: u64, ordinal: u32) -> Result<u32> {
    let position = entry_position(entry_size, ordinal)?;
    input.seek(SeekFrom::Start(position))?;
    let mut buf = [0u8; OFFSET_ENTRY_SIZE as usize];
    read_exact_or_corrupt(input, &mut buf, "offset entry")?;
    Ok(u32::from_be_bytes(buf))
}

/// Write the whole table in one pass starting right after the header.
pub fn write_offset_table<W: Write + Seek>(out: &mut W, entry_size: u64, offsets: &[u32]) -> Result<()> {
    check_entry_size(entry_size)?;
    let padding = (entry_size - OFFSET_ENTRY_SIZE) as usize;

    let mut table = Vec::with_capacity(offsets.len() * entry_size as usize);
    for offset in offsets {
        table.extend_from_slice(&offset.to_be_bytes());
        table.resize(table.len() + padding, 0);
    }

    out.seek(SeekFrom::Start(HEADER_SIZE))?;
    out.write_all(&table)?;
    Ok(())
}

fn check_entry_size(entry_size: u64) -> Result<()> {
    if entry_size < OFFSET_ENTRY_SIZE {
        return Err(FortuneError::Io(io::Error::new(
            ErrorKind::InvalidInput,
            format!("offset records are at least {OFFSET_ENTRY_SIZE} bytes wide, got {entry_size}"),
        )));
    }
    Ok(())
}

fn read_exact_or_corrupt<R: Read>(input: &mut R, buf: &mut [u8], what: &str) -> Result<()> {
    input.read_exact(buf).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => FortuneError::CorruptIndex(format!("truncated {what}")),
        _ => FortuneError::Io(e),
    })
}

/// An open index: header in memory, offset table read on demand.
#[derive(Debug)]
pub struct IndexFile {
    pub path: PathBuf,
    pub header: IndexHeader,
    reader: BufReader<File>,
}

impl IndexFile {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|_| FortuneError::MissingIndex(path.to_path_buf()))?;
        let mut reader = BufReader::new(file);
        let header = read_header(&mut reader)?;
        Ok(Self {
            path: path.to_path_buf(),
            header,
            reader,
        })
    }

    /// Source offset of the entry at 0-based `index`.
    pub fn offset(&mut self, index: u32) -> Result<u32> {
        if index >= self.header.entry_count {
            return Err(FortuneError::CorruptIndex(format!(
                "entry {index} out of range for {} entries in {}",
                self.header.entry_count,
                self.path.display()
            )));
        }
        read_offset_entry(&mut self.reader, OFFSET_ENTRY_SIZE, index + 1)
    }
}

/// Read only the header of the index at `path`.
pub fn load_header(path: &Path) -> Result<IndexHeader> {
    IndexFile::open(path).map(|index| index.header)
}
