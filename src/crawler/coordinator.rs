//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that:
//! - Walks the configured filters in order
//! - Discovers each filter's page count from its first list page
//! - Fetches the remaining list pages strictly in increasing offset order
//! - Claims, enriches and persists every entity not captured before

use crate::config::{Config, Filter};
use crate::crawler::detail::fetch_entity_detail;
use crate::crawler::fetcher::build_http_client;
use crate::crawler::list::{fetch_list_page, ListPage};
use crate::endpoint::{page_offset, Endpoints};
use crate::entity::{EntityDetail, EntityRecord, EntitySummary};
use crate::output::{CrawlStatistics, CsvSink, RecordSink};
use crate::state::{CrawlPhase, DedupStore, PaginationState};
use crate::RegistryError;
use reqwest::Client;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Main crawler coordinator structure
///
/// Owns every piece of mutable crawl state: the phase, the current
/// filter's pagination and the run-wide dedup store. Detail workers only
/// ever receive an identifier and hand back a detail; claiming identifiers
/// and appending rows stay here.
pub struct Coordinator<S: RecordSink> {
    config: Arc<Config>,
    endpoints: Arc<Endpoints>,
    client: Client,
    sink: S,
    seen: DedupStore,
    phase: CrawlPhase,
    pagination: PaginationState,
    stats: CrawlStatistics,
    detail_permits: Arc<Semaphore>,
}

impl<S: RecordSink> Coordinator<S> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `sink` - Where entity records are written
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(RegistryError)` - Endpoints or HTTP client could not be built
    pub fn new(config: Config, sink: S) -> Result<Self, RegistryError> {
        let endpoints = Endpoints::from_config(&config.site)?;
        let client = build_http_client(&config.user_agent)?;
        let permits = config.crawler.detail_concurrency.max(1) as usize;

        Ok(Self {
            config: Arc::new(config),
            endpoints: Arc::new(endpoints),
            client,
            sink,
            seen: DedupStore::new(),
            phase: CrawlPhase::ForEachFilter,
            pagination: PaginationState::Unknown,
            stats: CrawlStatistics::default(),
            detail_permits: Arc::new(Semaphore::new(permits)),
        })
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    pub fn pagination(&self) -> PaginationState {
        self.pagination
    }

    pub fn statistics(&self) -> &CrawlStatistics {
        &self.stats
    }

    /// Gives the sink back, e.g. to inspect what was written
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Runs the crawl to exhaustion of the configured filters
    ///
    /// Individual request failures never end the run; only an output
    /// failure does.
    pub async fn run(&mut self) -> Result<CrawlStatistics, RegistryError> {
        self.stats = CrawlStatistics::started();
        self.sink.initialize()?;

        let filters = self.config.filters();
        tracing::info!("Starting crawl of {} filters", filters.len());

        for filter in &filters {
            self.crawl_filter(filter).await?;
            self.transition(CrawlPhase::ForEachFilter)?;
        }

        self.transition(CrawlPhase::Done)?;
        debug_assert!(self.phase.is_terminal());
        self.stats.finish();

        tracing::info!(
            "Crawl completed: {} entities written, {} duplicates skipped, {} detail pages skipped",
            self.stats.entities_persisted,
            self.stats.duplicates_skipped,
            self.stats.details_failed
        );

        Ok(self.stats.clone())
    }

    /// Traverses every page of one filter
    async fn crawl_filter(&mut self, filter: &Filter) -> Result<(), RegistryError> {
        self.pagination = PaginationState::Unknown;
        tracing::info!("Fetching filter {}", filter);

        self.transition(CrawlPhase::FetchFirstPage)?;
        let first = self.fetch_list(filter, 0, true).await;

        self.transition(CrawlPhase::DiscoverPageCount)?;
        self.pagination = PaginationState::from_terminus(first.page.terminus_offset);
        match self.pagination {
            PaginationState::Known(pages) => {
                tracing::info!("Discovered {} pages for filter {}", pages, filter);
            }
            PaginationState::Unknown => {
                tracing::warn!(
                    "Page count for filter {} is unknown, only the first page will be processed",
                    filter
                );
                self.stats.page_counts_unknown += 1;
            }
        }
        self.process_entities(first.page.entities).await?;

        self.transition(CrawlPhase::ForEachSubsequentPage)?;
        let total = self.pagination.remaining_pages();
        for index in 1..=total {
            tracing::info!("Fetching page {} of {} ({})", index, total, filter);
            let page = self.fetch_list(filter, page_offset(index), false).await;
            self.process_entities(page.page.entities).await?;
        }

        self.transition(CrawlPhase::NextFilter)?;
        self.stats.filters_processed += 1;
        Ok(())
    }

    async fn fetch_list(&mut self, filter: &Filter, offset: u32, discover: bool) -> ListPage {
        debug_assert!(self.phase.is_within_filter());
        let timeout = self.config.crawler.list_timeout_ms.map(Duration::from_millis);
        let page = fetch_list_page(
            &self.client,
            &self.endpoints,
            filter,
            offset,
            discover,
            timeout,
        )
        .await;

        if page.fetched {
            self.stats.list_pages_fetched += 1;
        } else {
            self.stats.list_pages_failed += 1;
        }
        page
    }

    /// Enriches and persists the entities of one list page, in document order
    async fn process_entities(&mut self, entities: Vec<EntitySummary>) -> Result<(), RegistryError> {
        let claimed = self.claim(entities);
        if claimed.is_empty() {
            return Ok(());
        }

        let timeout = Duration::from_millis(self.config.crawler.detail_timeout_ms);

        if self.config.crawler.detail_concurrency <= 1 {
            for summary in claimed {
                let detail =
                    fetch_entity_detail(&self.client, &self.endpoints, &summary.id, timeout).await;
                self.persist(summary, detail)?;
            }
            return Ok(());
        }

        let pending: Vec<(EntitySummary, JoinHandle<Option<EntityDetail>>)> = claimed
            .into_iter()
            .map(|summary| {
                let handle = self.spawn_detail_fetch(summary.id.clone(), timeout);
                (summary, handle)
            })
            .collect();

        self.persist_in_order(pending).await
    }

    /// Awaits detail workers in document order, appending each row as it lands
    ///
    /// A fatal output error aborts the workers that are still pending.
    async fn persist_in_order(
        &mut self,
        pending: Vec<(EntitySummary, JoinHandle<Option<EntityDetail>>)>,
    ) -> Result<(), RegistryError> {
        let mut pending = pending.into_iter();
        while let Some((summary, handle)) = pending.next() {
            let detail = match handle.await {
                Ok(detail) => detail,
                Err(e) => {
                    tracing::warn!("Detail worker for entity {} failed: {}", summary.id, e);
                    None
                }
            };
            if let Err(e) = self.persist(summary, detail) {
                for (_, handle) in pending {
                    handle.abort();
                }
                return Err(e);
            }
        }

        Ok(())
    }

    /// Filters out identifiers already persisted or repeated on the same page
    fn claim(&mut self, entities: Vec<EntitySummary>) -> Vec<EntitySummary> {
        let mut claimed_ids = HashSet::new();
        let mut claimed = Vec::with_capacity(entities.len());

        for summary in entities {
            if self.seen.seen(&summary.id) || !claimed_ids.insert(summary.id.clone()) {
                tracing::debug!("Entity {} already captured, skipping", summary.id);
                self.stats.duplicates_skipped += 1;
                continue;
            }
            claimed.push(summary);
        }

        claimed
    }

    fn spawn_detail_fetch(
        &self,
        entity_id: String,
        timeout: Duration,
    ) -> JoinHandle<Option<EntityDetail>> {
        let client = self.client.clone();
        let endpoints = Arc::clone(&self.endpoints);
        let permits = Arc::clone(&self.detail_permits);

        tokio::spawn(async move {
            let _permit = permits.acquire_owned().await.ok()?;
            fetch_entity_detail(&client, &endpoints, &entity_id, timeout).await
        })
    }

    /// Writes one row, then marks its identifier as captured
    fn persist(
        &mut self,
        summary: EntitySummary,
        detail: Option<EntityDetail>,
    ) -> Result<(), RegistryError> {
        let detail = match detail {
            Some(detail) => {
                self.stats.details_fetched += 1;
                detail
            }
            None => {
                self.stats.details_failed += 1;
                EntityDetail::default()
            }
        };

        let record = EntityRecord::merge(summary, detail);
        self.sink.append(&record)?;
        self.seen.mark(record.id());
        self.stats.entities_persisted += 1;
        Ok(())
    }

    fn transition(&mut self, next: CrawlPhase) -> Result<(), RegistryError> {
        if !self.phase.can_transition_to(next) {
            return Err(RegistryError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::trace!("Crawl phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }
}

/// Runs the main crawl operation, writing to the configured CSV file
///
/// # Example
///
/// ```no_run
/// use registry_crawler::config::load_config;
/// use registry_crawler::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("registry.toml"))?;
/// let stats = run_crawl(config).await?;
/// println!("{} rows written", stats.entities_persisted);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlStatistics, RegistryError> {
    let sink = CsvSink::new(&config.output.csv_path, config.output.escaping);
    let mut coordinator = Coordinator::new(config, sink)?;
    coordinator.run().await
}
