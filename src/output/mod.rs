//! Output module for persisting crawl results
//!
//! This module handles:
//! - The append-only record sink contract
//! - CSV serialization of entity records
//! - Run statistics

mod csv_sink;
pub mod stats;
mod traits;

pub use csv_sink::CsvSink;
pub use stats::{print_statistics, CrawlStatistics};
pub use traits::{OutputError, OutputResult, RecordSink};
