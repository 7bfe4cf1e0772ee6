//! CSV output: per-search exports and merging them across searches

mod exporter;
mod merger;

pub use exporter::*;
pub use merger::*;
