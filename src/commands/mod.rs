//! CLI command implementations.

pub mod extract;
pub mod scrape;
pub mod serve;

pub use extract::extract_file;
pub use scrape::{RecordTarget, ScrapeCommand};
pub use serve::serve;
