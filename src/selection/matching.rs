use std::iter::FusedIterator;

use regex::{Regex, RegexBuilder};

use crate::selection::decode::LeafReader;
use crate::tree::{FileSystemNode, NodeKind};
use crate::types::{FortuneError, FortuneRecord, Result};

/// Compile `pattern` and return a lazy stream of every matching entry.
///
/// Leaves are visited depth-first in build order and each leaf is read from
/// its first entry to its last. Weights play no part here.
pub fn matching_fortunes<'a>(root: &'a FileSystemNode, pattern: &str, ignore_case: bool) -> Result<MatchingFortunes<'a>> {
    let pattern = RegexBuilder::new(pattern).case_insensitive(ignore_case).build()?;
    Ok(MatchingFortunes {
        pattern,
        pending: vec![root],
        cursor: None,
        finished: false,
    })
}

struct LeafCursor {
    reader: LeafReader,
    next: u32,
}

/// Finite, single-pass. Yields at most one error, after which it is exhausted.
pub struct MatchingFortunes<'a> {
    pattern: Regex,
    pending: Vec<&'a FileSystemNode>,
    cursor: Option<LeafCursor>,
    finished: bool,
}

impl MatchingFortunes<'_> {
    fn fail(&mut self, error: FortuneError) -> Option<Result<FortuneRecord>> {
        self.finished = true;
        self.cursor = None;
        self.pending.clear();
        Some(Err(error))
    }
}

impl Iterator for MatchingFortunes<'_> {
    type Item = Result<FortuneRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            if let Some(cursor) = self.cursor.as_mut() {
                if cursor.next < cursor.reader.entry_count() {
                    let index = cursor.next;
                    cursor.next += 1;
                    match cursor.reader.record(index) {
                        Ok(record) if self.pattern.is_match(&record.text) => return Some(Ok(record)),
                        Ok(_) => continue,
                        Err(e) => return self.fail(e),
                    }
                }
                // Leaf exhausted; drop its handles before opening the next one.
                self.cursor = None;
            }

            let Some(node) = self.pending.pop() else {
                self.finished = true;
                return None;
            };

            if !node.is_leaf() {
                self.pending.extend(node.children.iter().rev());
            } else if node.kind == NodeKind::File && node.num_entries > 0 {
                match LeafReader::open(node) {
                    Ok(reader) => self.cursor = Some(LeafCursor { reader, next: 0 }),
                    Err(e) => return self.fail(e),
                }
            }
        }
    }
}

impl FusedIterator for MatchingFortunes<'_> {}
