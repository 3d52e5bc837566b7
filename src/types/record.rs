use serde::{Deserialize, Serialize};

/// A single fortune as handed to the presentation layer.
/// Transient: produced per retrieval, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FortuneRecord {
    /// Base name of the fortune file the text came from.
    pub file_name: String,
    pub text: String,
}

impl FortuneRecord {
    pub fn new(file_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            text: text.into(),
        }
    }

    /// Length in bytes, the unit used by the length filters.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
