//! Binary index format: a fixed header followed by a table of big-endian
//! source offsets, one per entry.
//!
//! ```text
//! offset 0   header (24 bytes)
//!            version u32 | entry_count u32 | longest u32 | shortest u32
//!            flags u32 | delimiter u8 | reserved u8[3]
//! offset 24  entry_count x u32 offsets
//! ```

pub mod codec;
pub mod header;

pub use codec::{
    append_offset_entry, entry_position, load_header, read_header, read_offset_entry, write_header, write_offset_entry,
    write_offset_table, IndexFile,
};
pub use header::{IndexFlags, IndexHeader, DEFAULT_VERSION, HEADER_SIZE, OFFSET_ENTRY_SIZE};
