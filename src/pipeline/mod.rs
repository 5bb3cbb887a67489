//! Filtering pipeline.
//!
//! Each poll cycle's batch flows through:
//! 1. `filter::select_and_advance()`: conversation/kind/window/watermark predicates
//! 2. `sink::Processor::consume()`: once per qualifying record
//! 3. `watermark::Watermark::advance()`: after the batch is handed off

pub mod filter;
pub mod sink;
pub mod watermark;

pub use filter::{FilterCriteria, Selection, qualifies, select_and_advance, window_cutoff};
pub use sink::{LogProcessor, Processor};
pub use watermark::Watermark;
