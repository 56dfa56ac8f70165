//! Phases of the crawl orchestrator
//!
//! The orchestrator walks these in a fixed cycle per filter:
//! `ForEachFilter → FetchFirstPage → DiscoverPageCount → ForEachSubsequentPage → NextFilter`,
//! then back to `ForEachFilter` or on to `Done`.

use std::fmt;

/// Represents where the orchestrator is in its per-filter cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Picking the next unprocessed filter
    ForEachFilter,

    /// Fetching offset 0 of the current filter
    FetchFirstPage,

    /// Turning the first page's pagination terminus into a page count
    DiscoverPageCount,

    /// Fetching pages 1..=total in increasing offset order
    ForEachSubsequentPage,

    /// All pages of the current filter are exhausted
    NextFilter,

    /// All filters are exhausted
    Done,
}

impl CrawlPhase {
    /// Returns true if the orchestrator may move from `self` to `next`
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        use CrawlPhase::*;

        matches!(
            (self, next),
            (ForEachFilter, FetchFirstPage)
                | (ForEachFilter, Done)
                | (FetchFirstPage, DiscoverPageCount)
                | (DiscoverPageCount, ForEachSubsequentPage)
                | (ForEachSubsequentPage, NextFilter)
                | (NextFilter, ForEachFilter)
                | (NextFilter, Done)
        )
    }

    /// Returns true once nothing is left to crawl
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true while a filter is being traversed
    pub fn is_within_filter(&self) -> bool {
        matches!(
            self,
            Self::FetchFirstPage | Self::DiscoverPageCount | Self::ForEachSubsequentPage
        )
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ForEachFilter => "for_each_filter",
            Self::FetchFirstPage => "fetch_first_page",
            Self::DiscoverPageCount => "discover_page_count",
            Self::ForEachSubsequentPage => "for_each_subsequent_page",
            Self::NextFilter => "next_filter",
            Self::Done => "done",
        };
        write!(f, "{}", name)
    }
}
