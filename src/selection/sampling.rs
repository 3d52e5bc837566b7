use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::tree::{children_total, FileSystemNode};
use crate::types::{FortuneError, Result};

/// Process-wide generator for the composition root, seeded from the clock.
pub fn time_seeded_rng() -> StdRng {
    let now = Utc::now();
    let seed = now.timestamp_nanos_opt().unwrap_or_else(|| now.timestamp_micros());
    StdRng::seed_from_u64(seed as u64)
}

/// Walk from `root` to a leaf, choosing each child by its cumulative share.
///
/// Children are visited in build order so a fixed RNG stream always picks the
/// same path. The draw spans `[0, min(total, 100))`, which leaves
/// over-subscribed tails unreachable and spreads under-subscribed levels over
/// the shares that do exist.
pub fn sample_leaf<'a, R: Rng + ?Sized>(root: &'a FileSystemNode, rng: &mut R) -> Result<&'a FileSystemNode> {
    let mut node = root;

    while !node.is_leaf() {
        let span = children_total(node).min(100.0);
        if span <= 0.0 || !span.is_finite() {
            return Err(empty_under(node));
        }

        let draw = rng.random_range(0.0..span);
        let mut cumulative = 0.0;
        let mut chosen = None;
        for child in &node.children {
            cumulative += child.percent;
            if draw < cumulative {
                chosen = Some(child);
                break;
            }
        }

        // Rounding can leave the draw a hair past the last boundary.
        node = match chosen {
            Some(child) => child,
            None => node
                .children
                .iter()
                .rev()
                .find(|c| c.percent > 0.0)
                .ok_or_else(|| empty_under(node))?,
        };
    }

    if node.num_entries == 0 {
        return Err(FortuneError::EmptyCorpus(format!(
            "{} has no entries",
            node.path.display()
        )));
    }
    Ok(node)
}

/// Leaves that `sample_leaf` can reach: every share on the way down is positive.
pub fn reachable_leaves(root: &FileSystemNode) -> Vec<&FileSystemNode> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_leaf() {
            if node.num_entries > 0 {
                out.push(node);
            }
            continue;
        }
        stack.extend(node.children.iter().rev().filter(|c| c.percent > 0.0));
    }
    out
}

fn empty_under(node: &FileSystemNode) -> FortuneError {
    let name = if node.path.as_os_str().is_empty() {
        "search root".to_string()
    } else {
        node.path.display().to_string()
    };
    FortuneError::EmptyCorpus(format!("no eligible children under {name}"))
}
