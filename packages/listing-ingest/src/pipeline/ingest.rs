//! Ingestion pipeline - fetch, cache, parse and merge listings.

use async_trait::async_trait;
use tracing::{info, warn};

use super::cache::cache_page;
use crate::error::{IngestError, Result, StoreError};
use crate::jobs::{JobHandler, JobOutcome, Scheduler, SchedulerReport};
use crate::parser::{Parsers, RawListing};
use crate::stores::RecordStore;
use crate::traits::browser::BrowserClient;
use crate::traits::document_store::DocumentStore;
use crate::types::config::IngestConfig;
use crate::types::job::Job;
use crate::types::post::{Post, PostExtras};

/// Result of one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Enabled searches that were expanded into jobs
    pub searches: usize,

    /// First-page jobs queued before the run started
    pub jobs_queued: usize,

    /// Scheduler totals, continuations included
    pub report: SchedulerReport,

    /// Listings dropped by schema validation
    pub rejected_listings: usize,

    pub posts_before: usize,
    pub posts_after: usize,
}

impl RunSummary {
    /// Check if every job succeeded.
    pub fn is_success(&self) -> bool {
        self.report.failed == 0
    }

    pub fn new_posts(&self) -> usize {
        self.posts_after.saturating_sub(self.posts_before)
    }
}

/// Turn one parsed listing into a post fragment scoped to `job`.
pub fn post_fragment(job: &Job, listing: &RawListing) -> Post {
    Post {
        pid: listing.pid.clone(),
        sid: job.sid.clone(),
        source: job.source(),
        regions: [job.details.region().to_string()].into(),
        search_terms: [job.details.search_term().to_string()].into(),
        title: listing.title.clone(),
        post_date: listing.post_date.format("%Y-%m-%d").to_string(),
        price: listing.price,
        price_str: listing.price_str.clone(),
        hood: listing.hood.clone(),
        thumbnail_url: listing.thumbnail_url.clone(),
        url: Some(listing.url.clone()),
        extras: job.details.subcategory().map(|subcategory| PostExtras {
            subcategories: [subcategory.as_str().to_string()].into(),
        }),
    }
}

/// Handles one job at a time against a browser and a record store.
pub struct IngestHandler<B, D: DocumentStore> {
    browser: B,
    store: RecordStore<D>,
    parsers: Parsers,
    rejected: usize,
}

impl<B: BrowserClient, D: DocumentStore> IngestHandler<B, D> {
    pub fn new(browser: B, store: RecordStore<D>) -> Self {
        Self {
            browser,
            store,
            parsers: Parsers::default(),
            rejected: 0,
        }
    }

    /// Use custom parsers.
    pub fn with_parsers(mut self, parsers: Parsers) -> Self {
        self.parsers = parsers;
        self
    }

    pub fn store(&self) -> &RecordStore<D> {
        &self.store
    }

    pub fn browser(&self) -> &B {
        &self.browser
    }

    pub fn into_store(self) -> RecordStore<D> {
        self.store
    }
}

#[async_trait]
impl<B: BrowserClient, D: DocumentStore> JobHandler for IngestHandler<B, D> {
    async fn handle(&mut self, job: &Job) -> Result<JobOutcome> {
        let search = self
            .store
            .search(&job.sid)
            .cloned()
            .ok_or_else(|| IngestError::UnknownSearch {
                sid: job.sid.clone(),
            })?;

        let page = self.browser.fetch(&job.url).await?;
        cache_page(job, &page.html).await?;

        let parsed = self.parsers.for_source(job.source()).parse(&page.html)?;

        let mut upserted = 0;
        for listing in &parsed.listings {
            match self.store.upsert_post(post_fragment(job, listing), &search) {
                Ok(_) => upserted += 1,
                Err(StoreError::Validation(violation)) => {
                    self.rejected += 1;
                    warn!(jid = job.jid, pid = %listing.pid, violations = %violation, "listing rejected");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(JobOutcome {
            has_next_page: parsed.has_next_page,
            listings: parsed.listings.len(),
            upserted,
        })
    }
}

/// One ingestion run over every enabled search in the store.
///
/// # Example
///
/// ```rust,ignore
/// use listing_ingest::{HttpBrowser, Ingestion, IngestConfig, JsonFileStore, RecordStore};
///
/// let config = IngestConfig::from_env()?;
/// let store = RecordStore::open(JsonFileStore::new(&config.data_dir))?;
/// let mut ingestion = Ingestion::new(&config, HttpBrowser::from_config(&config)?, store);
/// let summary = ingestion.run().await;
/// ```
pub struct Ingestion<B, D: DocumentStore> {
    config: IngestConfig,
    handler: IngestHandler<B, D>,
}

impl<B: BrowserClient, D: DocumentStore> Ingestion<B, D> {
    pub fn new(config: &IngestConfig, browser: B, store: RecordStore<D>) -> Self {
        Self {
            config: config.clone(),
            handler: IngestHandler::new(browser, store),
        }
    }

    pub fn with_parsers(mut self, parsers: Parsers) -> Self {
        self.handler = self.handler.with_parsers(parsers);
        self
    }

    pub fn store(&self) -> &RecordStore<D> {
        self.handler.store()
    }

    pub fn into_store(self) -> RecordStore<D> {
        self.handler.into_store()
    }

    /// Queue jobs for enabled searches by rank, then drain the queue.
    pub async fn run(&mut self) -> RunSummary {
        let mut scheduler = Scheduler::new(&self.config);

        let searches: Vec<_> = self.handler.store.enabled_searches().into_iter().cloned().collect();
        for search in &searches {
            let jobs = scheduler.enqueue_search(search);
            info!(sid = %search.sid, alias = %search.alias, jobs, "queued search");
        }

        let posts_before = self.handler.store.post_count();
        let jobs_queued = scheduler.len();
        self.handler.rejected = 0;

        info!(
            searches = searches.len(),
            jobs = jobs_queued,
            browser = self.handler.browser.name(),
            "ingestion starting"
        );
        let report = scheduler.run(&mut self.handler).await;

        let summary = RunSummary {
            searches: searches.len(),
            jobs_queued,
            report,
            rejected_listings: self.handler.rejected,
            posts_before,
            posts_after: self.handler.store.post_count(),
        };
        info!(
            failed = summary.report.failed,
            new_posts = summary.new_posts(),
            rejected = summary.rejected_listings,
            "ingestion finished"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::{JidCounter, JobGenerator};
    use crate::testing::craigslist_search;
    use chrono::NaiveDate;

    fn listing() -> RawListing {
        RawListing {
            pid: "77".to_string(),
            url: "https://reno.craigslist.org/tls/d/saw/77.html".to_string(),
            title: "Saw".to_string(),
            post_date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            price: 15.0,
            price_str: "$15".to_string(),
            hood: None,
            thumbnail_url: "https://images.craigslist.org/77.jpg".to_string(),
        }
    }

    #[test]
    fn test_post_fragment_scoped_to_job() {
        let job = JobGenerator::new(&IngestConfig::default().without_pacing())
            .generate(&craigslist_search(), &mut JidCounter::new())
            .remove(1);

        let post = post_fragment(&job, &listing());
        assert_eq!(post.sid, "5");
        assert_eq!(post.regions.iter().collect::<Vec<_>>(), vec!["modesto"]);
        assert_eq!(post.search_terms.iter().collect::<Vec<_>>(), vec!["drill"]);
        assert_eq!(post.post_date, "2024-03-09");
        assert_eq!(
            post.extras.unwrap().subcategories.iter().collect::<Vec<_>>(),
            vec!["tools"]
        );
        assert_eq!(post.url.as_deref(), Some("https://reno.craigslist.org/tls/d/saw/77.html"));
    }

    #[test]
    fn test_summary_counts() {
        let summary = RunSummary {
            posts_before: 3,
            posts_after: 5,
            ..Default::default()
        };
        assert_eq!(summary.new_posts(), 2);
        assert!(summary.is_success());
    }
}
