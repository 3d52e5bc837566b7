use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FortuneError>;

#[derive(Debug, Error)]
pub enum FortuneError {
    #[error("Cannot read source file {path}: {source}")]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write index file {path}: {source}")]
    DestinationUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt index: {0}")]
    CorruptIndex(String),

    #[error("Missing index for fortune file: {0}")]
    MissingIndex(PathBuf),

    #[error("No eligible fortunes: {0}")]
    EmptyCorpus(String),

    #[error("Invalid pattern: {0}")]
    PatternInvalid(#[from] regex::Error),

    #[error("Invalid delimiter: {0:?}")]
    InvalidDelimiter(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FortuneError {
    /// Node-local errors are recovered by the tree loader; everything else aborts.
    pub fn is_node_local(&self) -> bool {
        matches!(self, FortuneError::MissingIndex(_))
    }
}
