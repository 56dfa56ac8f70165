//! Detail page fetcher
//!
//! Fetches one entity's detail page. A failure here never drops the
//! entity: the caller persists the summary with empty detail columns.

use crate::crawler::fetcher::{fetch_url, FetchResult};
use crate::crawler::parser::parse_detail_page;
use crate::endpoint::Endpoints;
use crate::entity::EntityDetail;
use reqwest::Client;
use std::time::Duration;

/// Fetches and extracts one entity's detail attributes
///
/// Returns `None` when the request failed or the page could not be
/// extracted; the failure has already been logged.
pub async fn fetch_entity_detail(
    client: &Client,
    endpoints: &Endpoints,
    entity_id: &str,
    timeout: Duration,
) -> Option<EntityDetail> {
    let url = endpoints.detail_page(entity_id);
    tracing::debug!("Requesting detail page: {}", url);

    let body = match fetch_url(client, &url, Some(timeout)).await {
        FetchResult::Success { body, .. } => body,
        failure => {
            tracing::warn!(
                "Detail fetch failed and was skipped (entity {}): {}",
                entity_id,
                failure.failure_reason().unwrap_or_default()
            );
            return None;
        }
    };

    match parse_detail_page(&body) {
        Ok(detail) => {
            tracing::info!("Entity {} fetched", entity_id);
            Some(detail)
        }
        Err(e) => {
            tracing::warn!(
                "Detail fetch failed and was skipped (entity {}): {}",
                entity_id,
                e
            );
            None
        }
    }
}
