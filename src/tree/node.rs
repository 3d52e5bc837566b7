use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::index::IndexHeader;

/// A user-supplied search path with an optional fixed share, e.g. `30% wisdom`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityPath {
    pub path: PathBuf,
    pub percentage: Option<f64>,
}

impl ProbabilityPath {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            percentage: None,
        }
    }

    pub fn with_percentage(path: impl Into<PathBuf>, percentage: f64) -> Self {
        Self {
            path: path.into(),
            percentage: Some(percentage),
        }
    }
}

/// Turn `["30%", "a", "b"]` into `[(a, 30%), (b, unset)]`.
///
/// A `N%` token applies to the next path. Malformed weights are ignored and a
/// trailing weight with no path after it is dropped.
pub fn parse_probability_args<I, S>(args: I) -> Vec<ProbabilityPath>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut paths = Vec::new();
    let mut pending: Option<f64> = None;

    for arg in args {
        let arg = arg.as_ref();
        match arg.strip_suffix('%') {
            Some(weight) => match weight.trim().parse::<f64>() {
                Ok(value) if value.is_finite() && value >= 0.0 => pending = Some(value),
                _ => warn!("ignoring malformed weight {arg:?}"),
            },
            None => paths.push(ProbabilityPath {
                path: PathBuf::from(arg),
                percentage: pending.take(),
            }),
        }
    }

    if let Some(value) = pending {
        warn!("weight {value}% is not followed by a path");
    }
    paths
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Root,
    Directory,
    File,
}

/// One node of the selection tree. Files are leaves; an empty child list
/// always means leaf, whatever the kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSystemNode {
    pub kind: NodeKind,
    pub path: PathBuf,
    pub index_path: Option<PathBuf>,
    /// Share fixed by the user, honored verbatim during assignment.
    pub requested_percent: Option<f64>,
    /// Share of the parent, 0-100.
    pub percent: f64,
    /// Entries in this file, or in all files below a directory.
    pub num_entries: u32,
    /// Index header of a file node, loaded once when the tree is built.
    pub header: Option<IndexHeader>,
    pub children: Vec<FileSystemNode>,
}

impl FileSystemNode {
    pub fn root(children: Vec<FileSystemNode>) -> Self {
        let num_entries = total_entries(&children);
        Self {
            kind: NodeKind::Root,
            path: PathBuf::new(),
            index_path: None,
            requested_percent: None,
            percent: 100.0,
            num_entries,
            header: None,
            children,
        }
    }

    pub fn directory(path: &Path, requested_percent: Option<f64>, children: Vec<FileSystemNode>) -> Self {
        let num_entries = total_entries(&children);
        Self {
            kind: NodeKind::Directory,
            path: path.to_path_buf(),
            index_path: None,
            requested_percent,
            percent: 0.0,
            num_entries,
            header: None,
            children,
        }
    }

    pub fn file(path: &Path, index_path: &Path, header: IndexHeader, requested_percent: Option<f64>) -> Self {
        Self {
            kind: NodeKind::File,
            path: path.to_path_buf(),
            index_path: Some(index_path.to_path_buf()),
            requested_percent,
            percent: 0.0,
            num_entries: header.entry_count,
            header: Some(header),
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Base name shown next to a fortune.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

fn total_entries(children: &[FileSystemNode]) -> u32 {
    children.iter().fold(0u32, |acc, c| acc.saturating_add(c.num_entries))
}
