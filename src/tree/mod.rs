pub mod loader;
pub mod node;
pub mod probability;

pub use loader::{build_tree, index_candidates};
pub use node::{parse_probability_args, FileSystemNode, NodeKind, ProbabilityPath};
pub use probability::{assign_probabilities, children_total};
