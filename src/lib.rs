//! Random-access fortune cookie indexes and weighted fortune selection.
//!
//! `fortune-core` builds the classic strfile index (a big-endian header plus
//! a table of entry offsets) for `%`-delimited text files, arranges indexed
//! files and directories into a weighted tree, and draws fortunes from it
//! without reading more of a source file than the chosen entry.

pub mod config;
pub mod index;
pub mod selection;
pub mod strfile;
pub mod tree;
pub mod types;

pub use types::{FortuneError, FortuneRecord, Result};
