//! Endpoint handling for the remote registry
//!
//! The registry exposes two GET endpoints: a paginated list filtered by
//! region and province, and a detail page keyed by entity identifier.
//! This module builds both request URLs and reads query parameters back
//! out of links found in the markup.

use crate::config::{Filter, SiteConfig};
use url::Url;

/// Number of entities on one list page. Fixed by the remote site.
pub const PAGE_SIZE: u32 = 20;

/// Query parameter carrying the region code
pub const REGION_PARAM: &str = "reg";

/// Query parameter carrying the province code
pub const PROVINCE_PARAM: &str = "pro";

/// Query parameter carrying the zero-based item offset
pub const OFFSET_PARAM: &str = "start";

/// Query parameter carrying the entity identifier
pub const ENTITY_ID_PARAM: &str = "id_societa";

/// Parsed endpoints of the registry
#[derive(Debug, Clone)]
pub struct Endpoints {
    list_url: Url,
    detail_url: Url,
}

impl Endpoints {
    /// Parses both endpoints from the site configuration
    pub fn from_config(site: &SiteConfig) -> Result<Self, url::ParseError> {
        Ok(Self {
            list_url: Url::parse(&site.list_url)?,
            detail_url: Url::parse(&site.detail_url)?,
        })
    }

    /// Builds the list page URL for a filter at the given item offset
    ///
    /// # Example
    ///
    /// ```
    /// use registry_crawler::config::{Filter, SiteConfig};
    /// use registry_crawler::endpoint::Endpoints;
    ///
    /// let site = SiteConfig {
    ///     list_url: "https://registry.example.com/list.html".to_string(),
    ///     detail_url: "https://registry.example.com/detail.html".to_string(),
    /// };
    /// let filter = Filter {
    ///     region_name: "Emilia-Romagna".to_string(),
    ///     region_code: 8,
    ///     province_abbreviation: "bo".to_string(),
    ///     province_name: "Bologna".to_string(),
    ///     province_code: 237,
    /// };
    /// let endpoints = Endpoints::from_config(&site).unwrap();
    /// assert_eq!(
    ///     endpoints.list_page(&filter, 40).as_str(),
    ///     "https://registry.example.com/list.html?reg=8&pro=237&start=40"
    /// );
    /// ```
    pub fn list_page(&self, filter: &Filter, offset: u32) -> Url {
        let mut url = self.list_url.clone();
        url.query_pairs_mut()
            .append_pair(REGION_PARAM, &filter.region_code.to_string())
            .append_pair(PROVINCE_PARAM, &filter.province_code.to_string())
            .append_pair(OFFSET_PARAM, &offset.to_string());
        url
    }

    /// Builds the detail page URL for an entity
    pub fn detail_page(&self, entity_id: &str) -> Url {
        let mut url = self.detail_url.clone();
        url.query_pairs_mut().append_pair(ENTITY_ID_PARAM, entity_id);
        url
    }
}

/// Item offset of a zero-based page index
pub fn page_offset(page_index: u32) -> u32 {
    page_index * PAGE_SIZE
}

/// Number of pages after the first one, derived from the pagination terminus
///
/// The terminus is the offset of the last page, so the subsequent pages
/// are `1..=total_pages(terminus)`.
pub fn total_pages(terminus_offset: u32) -> u32 {
    terminus_offset / PAGE_SIZE
}

/// Reads a query parameter out of a link, absolute or relative
///
/// Returns `None` when the link has no query string, the parameter is
/// absent, or its value is empty.
pub fn query_param(href: &str, name: &str) -> Option<String> {
    let without_fragment = href.split('#').next().unwrap_or_default();
    let (_, query) = without_fragment.split_once('?')?;

    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
