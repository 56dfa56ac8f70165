//! State module for tracking crawl progress
//!
//! All state here is owned by the orchestrator and lives for one run only.
//!
//! # Components
//!
//! - `CrawlPhase`: the orchestrator's per-filter state machine
//! - `PaginationState`: page count of the filter being traversed, reset per filter
//! - `DedupStore`: identifiers already persisted, scoped to the whole run

mod crawl_phase;
mod dedup;
mod pagination;

// Re-export main types
pub use crawl_phase::CrawlPhase;
pub use dedup::DedupStore;
pub use pagination::PaginationState;
