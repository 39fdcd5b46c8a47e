//! Amazon product page fetching and scanning.

pub mod client;
pub mod parser;
pub mod selectors;

pub use client::{PageFetcher, StoreClient};
pub use parser::{Parser, ScannedPage};
