pub mod builder;
pub mod config;
pub mod transform;

pub use builder::{default_index_path, StrfileBuilder};
pub use config::{StrfileConfig, StrfileStats, DEFAULT_DELIMITER};
pub use transform::{rot13, sort_key, trim_line_ending};
