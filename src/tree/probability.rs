use log::{debug, warn};

use crate::tree::node::FileSystemNode;

/// Partition 100% among the children of every node, level by level.
///
/// Requested shares are kept as given, even when they add up to more than
/// 100. The rest goes to children without a requested share, either equally
/// (`consider_all_equal`) or in proportion to their entry counts. Children
/// with no entries and no requested share get nothing.
pub fn assign_probabilities(node: &mut FileSystemNode, consider_all_equal: bool) {
    if node.is_leaf() {
        return;
    }

    let requested: f64 = node.children.iter().filter_map(|c| c.requested_percent).sum();
    if requested > 100.0 {
        warn!(
            "requested shares under {} add up to {requested:.2}%",
            display_name(node)
        );
    }
    let remaining = (100.0 - requested).max(0.0);

    let open: Vec<&FileSystemNode> = node
        .children
        .iter()
        .filter(|c| c.requested_percent.is_none() && c.num_entries > 0)
        .collect();
    let weight_total: f64 = if consider_all_equal {
        open.len() as f64
    } else {
        open.iter().map(|c| f64::from(c.num_entries)).sum()
    };

    for child in &mut node.children {
        child.percent = match child.requested_percent {
            Some(share) => share,
            None if child.num_entries == 0 || weight_total == 0.0 => 0.0,
            None if consider_all_equal => remaining / weight_total,
            None => remaining * f64::from(child.num_entries) / weight_total,
        };
        debug!("{:6.2}% {}", child.percent, child.path.display());
    }

    for child in &mut node.children {
        assign_probabilities(child, consider_all_equal);
    }
}

/// Sum of the direct children's shares.
pub fn children_total(node: &FileSystemNode) -> f64 {
    node.children.iter().map(|c| c.percent).sum()
}

fn display_name(node: &FileSystemNode) -> String {
    if node.path.as_os_str().is_empty() {
        "the search root".to_string()
    } else {
        node.path.display().to_string()
    }
}
