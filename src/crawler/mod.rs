//! Crawler module for registry page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and failure classification
//! - HTML extraction of list and detail pages
//! - List and detail page fetchers that swallow per-request failures
//! - Overall crawl coordination

mod coordinator;
mod detail;
mod fetcher;
mod list;
mod parser;

pub use coordinator::{run_crawl, Coordinator};
pub use detail::fetch_entity_detail;
pub use fetcher::{build_http_client, fetch_url, user_agent, FetchResult};
pub use list::{fetch_list_page, ListPage};
pub use parser::{
    extract_page, parse_detail_page, parse_list_page, ExtractError, Extracted, PageKind,
    ParsedListPage,
};

use crate::config::Config;
use crate::output::CrawlStatistics;
use crate::RegistryError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Truncate the output file and write its header
/// 2. Build the HTTP client
/// 3. For every filter, fetch the first list page and discover the page count
/// 4. Fetch the remaining list pages in order
/// 5. Fetch details and append a row for every entity not seen before
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Crawl ran to exhaustion of the filters
/// * `Err(RegistryError)` - The output could not be written
pub async fn crawl(config: Config) -> Result<CrawlStatistics, RegistryError> {
    run_crawl(config).await
}
