//! Run statistics
//!
//! Counters kept by the orchestrator while crawling, printed at the end
//! of a run.

use chrono::{DateTime, Utc};

/// Crawl statistics summary
#[derive(Debug, Clone, Default)]
pub struct CrawlStatistics {
    /// When the run started
    pub started_at: Option<DateTime<Utc>>,

    /// When the run finished
    pub finished_at: Option<DateTime<Utc>>,

    /// Filters whose traversal completed
    pub filters_processed: u64,

    /// List pages fetched and extracted
    pub list_pages_fetched: u64,

    /// List pages skipped after a failure
    pub list_pages_failed: u64,

    /// Filters whose page count could not be discovered
    pub page_counts_unknown: u64,

    /// Detail pages fetched and extracted
    pub details_fetched: u64,

    /// Detail pages skipped after a failure
    pub details_failed: u64,

    /// Rows written to the output
    pub entities_persisted: u64,

    /// List entries skipped because their identifier was already handled
    pub duplicates_skipped: u64,
}

impl CrawlStatistics {
    /// Creates statistics stamped with the current time as start
    pub fn started() -> Self {
        Self {
            started_at: Some(Utc::now()),
            ..Self::default()
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Wall-clock duration of the run, once finished
    pub fn duration_seconds(&self) -> Option<i64> {
        match (self.started_at, self.finished_at) {
            (Some(started), Some(finished)) => Some((finished - started).num_seconds()),
            _ => None,
        }
    }

    /// Share of attempted detail fetches that succeeded, as a percentage
    pub fn detail_success_rate(&self) -> f64 {
        let attempted = self.details_fetched + self.details_failed;
        if attempted == 0 {
            return 0.0;
        }
        (self.details_fetched as f64 / attempted as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    if let Some(started) = stats.started_at {
        println!("Started:  {}", started.to_rfc3339());
    }
    if let Some(finished) = stats.finished_at {
        println!("Finished: {}", finished.to_rfc3339());
    }
    if let Some(seconds) = stats.duration_seconds() {
        println!("Duration: {}s", seconds);
    }
    println!();

    println!("Pages:");
    println!("  Filters processed: {}", stats.filters_processed);
    println!("  List pages fetched: {}", stats.list_pages_fetched);
    println!("  List pages skipped: {}", stats.list_pages_failed);
    println!("  Unknown page counts: {}", stats.page_counts_unknown);
    println!();

    println!("Entities:");
    println!("  Rows written: {}", stats.entities_persisted);
    println!("  Duplicates skipped: {}", stats.duplicates_skipped);
    println!("  Details fetched: {}", stats.details_fetched);
    println!("  Details skipped: {}", stats.details_failed);
    println!();

    println!(
        "Detail Success Rate: {:.1}% ({} / {} detail pages)",
        stats.detail_success_rate(),
        stats.details_fetched,
        stats.details_fetched + stats.details_failed
    );
}
