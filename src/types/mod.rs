pub mod error;
pub mod record;

pub use error::{FortuneError, Result};
pub use record::FortuneRecord;
