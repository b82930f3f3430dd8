//! Single-flight job queue with politeness pacing.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{error, info, warn};

use super::generator::JobGenerator;
use super::JidCounter;
use crate::error::Result;
use crate::types::config::IngestConfig;
use crate::types::job::Job;
use crate::types::search::Search;

/// What one successful job reported back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobOutcome {
    /// The page reported further results.
    pub has_next_page: bool,
    /// Listings read from the page.
    pub listings: usize,
    /// Listings that made it into the store.
    pub upserted: usize,
}

/// Does the work for one job: fetch, parse, store.
#[async_trait]
pub trait JobHandler: Send {
    async fn handle(&mut self, job: &Job) -> Result<JobOutcome>;
}

/// Totals for one run of the queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerReport {
    /// Jobs taken off the queue, failed ones included.
    pub executed: usize,
    /// Jobs whose final attempt failed.
    pub failed: usize,
    /// Continuation jobs inserted during the run.
    pub continuations: usize,
    pub listings: usize,
    pub upserted: usize,
}

impl SchedulerReport {
    pub fn succeeded(&self) -> usize {
        self.executed - self.failed
    }
}

/// Owns the job queue, the read position and the jid counter.
///
/// Exactly one job is in flight at a time. Each attempt runs the handler
/// and the job's politeness delay together and waits for both, so a slow
/// fetch absorbs the delay rather than adding to it.
pub struct Scheduler {
    queue: Vec<Job>,
    pointer: usize,
    jids: JidCounter,
    generator: JobGenerator,
    max_retries: u32,
    max_pages: u32,
}

impl Scheduler {
    pub fn new(config: &IngestConfig) -> Self {
        Self {
            queue: Vec::new(),
            pointer: 0,
            jids: JidCounter::new(),
            generator: JobGenerator::new(config),
            max_retries: config.max_retries,
            max_pages: config.max_pages,
        }
    }

    /// Append every first-page job for `search`. Returns how many were added.
    pub fn enqueue_search(&mut self, search: &Search) -> usize {
        let jobs = self.generator.generate(search, &mut self.jids);
        let added = jobs.len();
        self.queue.extend(jobs);
        added
    }

    pub fn queue(&self) -> &[Job] {
        &self.queue
    }

    /// Index of the next job to run.
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.pointer >= self.queue.len()
    }

    /// Insert the next-page job for the job at `position` right after it.
    ///
    /// Jobs already queued keep their jids; those after `position` shift
    /// back by one. Returns the new jid.
    pub fn insert_continuation(&mut self, position: usize) -> Option<u64> {
        let job = self.queue.get(position)?;
        let next = self.generator.continuation(job, self.jids.next_jid());
        let jid = next.jid;
        self.queue.insert(position + 1, next);
        Some(jid)
    }

    /// Run until the pointer reaches the end of the queue.
    pub async fn run<H>(&mut self, handler: &mut H) -> SchedulerReport
    where
        H: JobHandler + ?Sized,
    {
        let mut report = SchedulerReport::default();

        if self.is_finished() {
            info!("job queue is empty, nothing to run");
            return report;
        }
        info!(jobs = self.queue.len() - self.pointer, "running job queue");

        while self.pointer < self.queue.len() {
            let job = self.queue[self.pointer].clone();
            report.executed += 1;

            match self.execute(&job, handler).await {
                Ok(outcome) => {
                    report.listings += outcome.listings;
                    report.upserted += outcome.upserted;
                    info!(
                        jid = job.jid,
                        listings = outcome.listings,
                        upserted = outcome.upserted,
                        has_next_page = outcome.has_next_page,
                        "job complete"
                    );
                    if outcome.has_next_page && job.page >= self.max_pages {
                        warn!(
                            jid = job.jid,
                            page = job.page,
                            max_pages = self.max_pages,
                            "page limit reached, not following"
                        );
                    } else if outcome.has_next_page {
                        if let Some(jid) = self.insert_continuation(self.pointer) {
                            report.continuations += 1;
                            info!(jid = job.jid, next_jid = jid, page = job.page + 1, "queued continuation");
                        }
                    }
                }
                Err(e) => {
                    report.failed += 1;
                    error!(jid = job.jid, url = %job.url, error = %e, "job failed");
                }
            }

            self.pointer += 1;
        }

        info!(
            executed = report.executed,
            failed = report.failed,
            continuations = report.continuations,
            "job queue drained"
        );
        report
    }

    async fn execute<H>(&self, job: &Job, handler: &mut H) -> Result<JobOutcome>
    where
        H: JobHandler + ?Sized,
    {
        let mut attempt = 0;
        loop {
            let wait_ms = if attempt == 0 {
                job.random_wait_time
            } else {
                self.generator.draw_wait_ms(job.source())
            };

            info!(jid = job.jid, url = %job.url, wait_ms, attempt, "starting job");
            let (result, ()) = tokio::join!(
                handler.handle(job),
                tokio::time::sleep(Duration::from_millis(wait_ms))
            );

            match result {
                Ok(outcome) => return Ok(outcome),
                Err(e) if attempt < self.max_retries => {
                    attempt += 1;
                    warn!(jid = job.jid, error = %e, attempt, "job attempt failed, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }
}
