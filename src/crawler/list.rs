//! List page fetcher
//!
//! Fetches one page of the directory for a filter at a given offset.
//! Every failure is page-level: it is logged and yields an empty page.

use crate::config::Filter;
use crate::crawler::fetcher::{fetch_url, FetchResult};
use crate::crawler::parser::{parse_list_page, ParsedListPage};
use crate::endpoint::Endpoints;
use reqwest::Client;
use std::time::Duration;

/// Outcome of one list page request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Parsed content; empty when the request or extraction failed
    pub page: ParsedListPage,

    /// False when the page was skipped because of a failure
    pub fetched: bool,
}

/// Fetches and extracts one list page
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `endpoints` - Registry endpoints
/// * `filter` - Region and province to list
/// * `offset` - Zero-based item offset
/// * `discover` - Whether to keep the pagination terminus (first page of a filter only)
/// * `timeout` - Request timeout; `None` leaves the request unbounded
pub async fn fetch_list_page(
    client: &Client,
    endpoints: &Endpoints,
    filter: &Filter,
    offset: u32,
    discover: bool,
    timeout: Option<Duration>,
) -> ListPage {
    let url = endpoints.list_page(filter, offset);
    tracing::debug!("Requesting list page: {}", url);

    let body = match fetch_url(client, &url, timeout).await {
        FetchResult::Success { body, .. } => body,
        failure => {
            tracing::warn!(
                "Page fetch failed and was skipped ({}, offset {}): {}",
                filter,
                offset,
                failure.failure_reason().unwrap_or_default()
            );
            return ListPage::default();
        }
    };

    match parse_list_page(&body) {
        Ok(mut page) => {
            if !discover {
                page.terminus_offset = None;
            }
            tracing::debug!(
                "List page {} offset {}: {} entities",
                filter,
                offset,
                page.entities.len()
            );
            ListPage {
                page,
                fetched: true,
            }
        }
        Err(e) => {
            tracing::warn!(
                "Page fetch failed and was skipped ({}, offset {}): {}",
                filter,
                offset,
                e
            );
            ListPage::default()
        }
    }
}
