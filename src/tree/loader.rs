use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::index::load_header;
use crate::tree::node::{FileSystemNode, ProbabilityPath};
use crate::types::{FortuneError, Result};

const INDEX_EXTENSION: &str = "dat";

/// Where the index of `source` may live: `<source>.dat`, then `<stem>.dat`.
pub fn index_candidates(source: &Path) -> Vec<PathBuf> {
    let appended = appended_index_path(source);
    let replaced = source.with_extension(INDEX_EXTENSION);

    if appended == replaced {
        vec![appended]
    } else {
        vec![appended, replaced]
    }
}

fn appended_index_path(source: &Path) -> PathBuf {
    let mut appended = source.as_os_str().to_os_string();
    appended.push(".");
    appended.push(INDEX_EXTENSION);
    PathBuf::from(appended)
}

/// Build the unweighted tree mirroring `paths`.
///
/// Directories contribute one level of file children; nested directories are
/// not expanded. Fortune files without a readable index are skipped with a
/// warning, every other failure aborts.
pub fn build_tree(paths: &[ProbabilityPath]) -> Result<FileSystemNode> {
    let mut children = Vec::with_capacity(paths.len());

    for input in paths {
        let metadata = fs::metadata(&input.path).map_err(|e| FortuneError::SourceUnreadable {
            path: input.path.clone(),
            source: e,
        })?;

        if metadata.is_dir() {
            children.push(load_directory(&input.path, input.percentage)?);
        } else {
            let loaded = load_file(&input.path, index_candidates(&input.path), input.percentage);
            if let Some(leaf) = skip_node_local(loaded)? {
                children.push(leaf);
            }
        }
    }

    Ok(FileSystemNode::root(children))
}

fn load_directory(dir: &Path, requested_percent: Option<f64>) -> Result<FileSystemNode> {
    let unreadable = |e| FortuneError::SourceUnreadable {
        path: dir.to_path_buf(),
        source: e,
    };

    let mut members = Vec::new();
    for entry in fs::read_dir(dir).map_err(unreadable)? {
        let entry = entry.map_err(unreadable)?;
        members.push(entry.path());
    }
    // read_dir order is platform dependent; sampling order must not be.
    members.sort();

    let mut files = Vec::new();
    for path in members {
        if !is_fortune_candidate(&path) {
            continue;
        }
        if path.is_dir() {
            debug!("not descending into nested directory {}", path.display());
            continue;
        }
        files.push(path);
    }

    // `art` and `art.u8` both map to `art.dat`. A shared name is only used as
    // an appended name, never as a fallback.
    let mut claims: HashMap<PathBuf, usize> = HashMap::new();
    for path in &files {
        *claims.entry(path.with_extension(INDEX_EXTENSION)).or_default() += 1;
    }

    let mut children = Vec::new();
    for path in files {
        let appended = appended_index_path(&path);
        let candidates: Vec<PathBuf> = index_candidates(&path)
            .into_iter()
            .filter(|candidate| *candidate == appended || claims.get(candidate) == Some(&1))
            .collect();
        if let Some(leaf) = skip_node_local(load_file(&path, candidates, None))? {
            children.push(leaf);
        }
    }

    if children.is_empty() {
        warn!("no indexed fortune files in {}", dir.display());
    }
    Ok(FileSystemNode::directory(dir, requested_percent, children))
}

fn load_file(path: &Path, candidates: Vec<PathBuf>, requested_percent: Option<f64>) -> Result<FileSystemNode> {
    let index_path = candidates
        .into_iter()
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| FortuneError::MissingIndex(path.to_path_buf()))?;

    let header = load_header(&index_path)?;
    debug!(
        "{}: {} entries (index {})",
        path.display(),
        header.entry_count,
        index_path.display()
    );
    Ok(FileSystemNode::file(path, &index_path, header, requested_percent))
}

fn skip_node_local(result: Result<FileSystemNode>) -> Result<Option<FileSystemNode>> {
    match result {
        Ok(node) => Ok(Some(node)),
        Err(e) if e.is_node_local() => {
            warn!("skipping: {e}");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Hidden files, indexes and half-written indexes are never fortune files.
fn is_fortune_candidate(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    !(name.starts_with('.') || name.ends_with(".dat") || name.ends_with(".tmp"))
}
