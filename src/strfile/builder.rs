use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::index::{append_offset_entry, write_header, write_offset_table, IndexHeader, OFFSET_ENTRY_SIZE};
use crate::strfile::config::{StrfileConfig, StrfileStats};
use crate::strfile::transform::{sort_key, trim_line_ending};
use crate::types::{FortuneError, Result};

/// `fortunes.txt` -> `fortunes.dat`, `fortunes` -> `fortunes.dat`.
pub fn default_index_path(source: &Path) -> PathBuf {
    source.with_extension("dat")
}

type Observer = Box<dyn Fn(&StrfileStats)>;

/// Builds the random-access index for one delimited source file.
///
/// Single-threaded; one builder call owns both file handles for its duration.
pub struct StrfileBuilder {
    config: StrfileConfig,
    observer: Option<Observer>,
}

/// Entry awaiting a reordering pass.
struct PendingEntry {
    key: Vec<u8>,
    offset: u32,
}

/// Running min/max over entry lengths.
struct EntryStats {
    count: u32,
    longest: u32,
    shortest: u32,
}

impl EntryStats {
    fn new() -> Self {
        Self {
            count: 0,
            longest: 0,
            shortest: u32::MAX,
        }
    }

    fn record(&mut self, len: u32) {
        self.count += 1;
        self.longest = self.longest.max(len);
        self.shortest = self.shortest.min(len);
    }
}

impl StrfileBuilder {
    pub fn new(config: StrfileConfig) -> Self {
        Self {
            config,
            observer: None,
        }
    }

    /// Called with the final statistics after a successful build.
    pub fn with_observer(mut self, observer: impl Fn(&StrfileStats) + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Scan `source` and write its index to `index_path`.
    ///
    /// The index is written next to its destination under a temporary name and
    /// renamed into place only once complete, so a failed build never leaves a
    /// truncated index behind.
    pub fn build<R: Rng + ?Sized>(&self, source: &Path, index_path: &Path, rng: &mut R) -> Result<StrfileStats> {
        self.config.validate()?;

        let input = File::open(source).map_err(|e| FortuneError::SourceUnreadable {
            path: source.to_path_buf(),
            source: e,
        })?;

        let temp_path = temp_index_path(index_path);
        let output = File::create(&temp_path).map_err(|e| FortuneError::DestinationUnwritable {
            path: index_path.to_path_buf(),
            source: e,
        })?;

        let result = self.write_index(source, BufReader::new(input), BufWriter::new(output), index_path, rng);
        match result {
            Ok(stats) => {
                fs::rename(&temp_path, index_path).map_err(|e| FortuneError::DestinationUnwritable {
                    path: index_path.to_path_buf(),
                    source: e,
                })?;
                debug!(
                    "indexed {} entries from {} into {}",
                    stats.entry_count,
                    source.display(),
                    index_path.display()
                );
                if let Some(observer) = &self.observer {
                    observer(&stats);
                }
                Ok(stats)
            }
            Err(e) => {
                if let Err(cleanup) = fs::remove_file(&temp_path) {
                    warn!("could not remove {}: {cleanup}", temp_path.display());
                }
                Err(e)
            }
        }
    }

    fn write_index<R: Rng + ?Sized>(
        &self,
        source: &Path,
        mut input: BufReader<File>,
        mut output: BufWriter<File>,
        index_path: &Path,
        rng: &mut R,
    ) -> Result<StrfileStats> {
        let delimiter = self.config.delimiter.as_bytes();
        let buffered = self.config.buffers_entries();

        let mut stats = EntryStats::new();
        let mut pending: Vec<PendingEntry> = Vec::new();
        let mut entry: Vec<u8> = Vec::new();
        let mut line: Vec<u8> = Vec::new();
        // Offsets point at the first byte of their own entry.
        let mut entry_start: u64 = 0;
        let mut position: u64 = 0;

        let unwritable = |e: FortuneError| match e {
            FortuneError::Io(source) => FortuneError::DestinationUnwritable {
                path: index_path.to_path_buf(),
                source,
            },
            other => other,
        };
        // Placeholder header; back-filled once the statistics are known. The
        // writer is left at the start of the offset table.
        write_header(&mut output, &IndexHeader::new(0, 0, u32::MAX, self.config.flags(), &self.config.delimiter))
            .map_err(unwritable)?;

        loop {
            line.clear();
            let read = input.read_until(b'\n', &mut line).map_err(|e| FortuneError::SourceUnreadable {
                path: source.to_path_buf(),
                source: e,
            })?;
            if read == 0 {
                break;
            }
            position += read as u64;

            if trim_line_ending(&line) != delimiter {
                entry.extend_from_slice(&line);
                continue;
            }

            let offset = to_u32(entry_start, "source offset")?;
            stats.record(to_u32(entry.len() as u64, "entry length")?);

            if buffered {
                let key = if self.config.order {
                    sort_key(&entry, self.config.ignore_case, self.config.rotate13)
                } else {
                    Vec::new()
                };
                pending.push(PendingEntry { key, offset });
            } else {
                append_offset_entry(&mut output, OFFSET_ENTRY_SIZE, offset).map_err(unwritable)?;
            }

            entry.clear();
            entry_start = position;
        }

        if !entry.is_empty() {
            debug!(
                "{}: {} trailing bytes after the last delimiter are not indexed",
                source.display(),
                entry.len()
            );
        }

        if buffered {
            if self.config.order {
                // Stable: equal keys keep source order.
                pending.sort_by(|a, b| a.key.cmp(&b.key));
            } else {
                pending.shuffle(rng);
            }
            let offsets: Vec<u32> = pending.iter().map(|p| p.offset).collect();
            write_offset_table(&mut output, OFFSET_ENTRY_SIZE, &offsets).map_err(unwritable)?;
        }

        let flags = self.config.flags();
        let header = IndexHeader::new(stats.count, stats.longest, stats.shortest, flags, &self.config.delimiter);
        write_header(&mut output, &header).map_err(unwritable)?;
        output.flush().map_err(|e| FortuneError::DestinationUnwritable {
            path: index_path.to_path_buf(),
            source: e,
        })?;
        output
            .get_ref()
            .sync_all()
            .map_err(|e| FortuneError::DestinationUnwritable {
                path: index_path.to_path_buf(),
                source: e,
            })?;

        Ok(StrfileStats {
            index_path: index_path.to_path_buf(),
            entry_count: stats.count,
            longest_entry_bytes: stats.longest,
            shortest_entry_bytes: stats.shortest,
            flags,
        })
    }
}

fn temp_index_path(index_path: &Path) -> PathBuf {
    let mut name = index_path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    index_path.with_file_name(name)
}

fn to_u32(value: u64, what: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| {
        FortuneError::Io(io::Error::new(
            ErrorKind::InvalidData,
            format!("{what} {value} does not fit the 32-bit index format"),
        ))
    })
}
