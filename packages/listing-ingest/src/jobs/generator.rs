//! Expands searches into jobs.

use tracing::debug;

use super::JidCounter;
use crate::types::config::IngestConfig;
use crate::types::enums::{CraigslistRegion, CraigslistSubcategory, FacebookRadius, FacebookRegion, Source};
use crate::types::job::{search_results_home_dir, Job, JobDetails};
use crate::types::search::Search;

/// Builds jobs and their continuations.
///
/// Order is fixed: sources as declared, then search terms, then region,
/// then subcategory (craigslist) or regional detail (facebook).
#[derive(Debug, Clone)]
pub struct JobGenerator {
    config: IngestConfig,
}

impl JobGenerator {
    pub fn new(config: &IngestConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// All first-page jobs for `search`.
    ///
    /// A declared source without its detail block yields no jobs.
    pub fn generate(&self, search: &Search, jids: &mut JidCounter) -> Vec<Job> {
        let mut jobs = Vec::new();
        let mut visited = Vec::with_capacity(search.sources.len());

        for &source in &search.sources {
            if visited.contains(&source) {
                continue;
            }
            visited.push(source);

            let before = jobs.len();
            match source {
                Source::Craigslist => {
                    let Some(details) = &search.craigslist_search_details else {
                        debug!(sid = %search.sid, "no craigslist details, skipping source");
                        continue;
                    };
                    for (index, term) in details.search_terms.iter().enumerate() {
                        for &region in &details.regions {
                            for &subcategory in &details.subcategories {
                                let details = JobDetails::Craigslist {
                                    search_term: term.clone(),
                                    region,
                                    subcategory,
                                };
                                jobs.push(self.build(search, details, index, jids));
                            }
                        }
                    }
                }
                Source::Facebook => {
                    let Some(details) = &search.facebook_search_details else {
                        debug!(sid = %search.sid, "no facebook details, skipping source");
                        continue;
                    };
                    for (index, term) in details.search_terms.iter().enumerate() {
                        for regional in &details.regional_details {
                            let details = JobDetails::Facebook {
                                search_term: term.clone(),
                                region: regional.region,
                                distance: regional.distance,
                            };
                            jobs.push(self.build(search, details, index, jids));
                        }
                    }
                }
            }
            debug!(sid = %search.sid, source = %source, jobs = jobs.len() - before, "generated jobs");
        }

        jobs
    }

    /// The job for the results page after `job`.
    ///
    /// Coordinates are kept, the URL is recomposed for the new page and a
    /// fresh wait time is drawn.
    pub fn continuation(&self, job: &Job, jid: u64) -> Job {
        let page = job.page + 1;
        Job {
            jid,
            page,
            url: next_page_url(&job.url, &job.details, page),
            random_wait_time: self.config.draw_wait_ms(job.source()),
            ..job.clone()
        }
    }

    /// A fresh politeness delay for `source`.
    pub fn draw_wait_ms(&self, source: Source) -> u64 {
        self.config.draw_wait_ms(source)
    }

    fn build(
        &self,
        search: &Search,
        details: JobDetails,
        search_term_index: usize,
        jids: &mut JidCounter,
    ) -> Job {
        let source = details.source();
        let url = match &details {
            JobDetails::Craigslist {
                search_term,
                region,
                subcategory,
            } => craigslist_url(
                search_term,
                *region,
                *subcategory,
                search.min_price,
                search.max_price,
                1,
            ),
            JobDetails::Facebook {
                search_term,
                region,
                distance,
            } => facebook_url(
                search_term,
                *region,
                *distance,
                search.min_price,
                search.max_price,
            ),
        };

        Job {
            jid: jids.next_jid(),
            sid: search.sid.clone(),
            alias: search.alias.clone(),
            details,
            search_term_index,
            page: 1,
            url,
            random_wait_time: self.config.draw_wait_ms(source),
            search_results_home_dir: search_results_home_dir(
                &self.config.cache_dir,
                &search.alias,
                source,
            ),
        }
    }
}

/// Listings per craigslist results page; the `s` query offset steps by this.
pub const CRAIGSLIST_PAGE_SIZE: u32 = 120;

/// Gallery-view search URL for one craigslist results page (1-based).
///
/// Pages after the first carry the result offset in the query as well as
/// the fragment, since fragments never reach the server.
pub fn craigslist_url(
    search_term: &str,
    region: CraigslistRegion,
    subcategory: CraigslistSubcategory,
    min_price: Option<f64>,
    max_price: Option<f64>,
    page: u32,
) -> String {
    let mut url = format!(
        "https://{}.craigslist.org/search/{}?query={}",
        region,
        subcategory.code(),
        urlencoding::encode(search_term)
    );
    if let Some(min) = min_price {
        url.push_str(&format!("&min_price={min}"));
    }
    if let Some(max) = max_price {
        url.push_str(&format!("&max_price={max}"));
    }
    if page > 1 {
        url.push_str(&format!("&s={}", (page - 1) * CRAIGSLIST_PAGE_SIZE));
    }
    url.push_str(&craigslist_fragment(page));
    url
}

/// Marketplace search URL, newest first.
pub fn facebook_url(
    search_term: &str,
    region: FacebookRegion,
    distance: FacebookRadius,
    min_price: Option<f64>,
    max_price: Option<f64>,
) -> String {
    let mut url = format!(
        "https://www.facebook.com/marketplace/{}/search?query={}&radius={}",
        region,
        urlencoding::encode(search_term),
        distance
    );
    if let Some(min) = min_price {
        url.push_str(&format!("&minPrice={min}"));
    }
    if let Some(max) = max_price {
        url.push_str(&format!("&maxPrice={max}"));
    }
    url.push_str("&sortBy=creation_time_descend&exact=false");
    url
}

fn craigslist_fragment(page: u32) -> String {
    format!("#search=1~gallery~{}~0", page.saturating_sub(1))
}

// Facebook pages by scrolling, so only craigslist URLs change per page.
fn next_page_url(url: &str, details: &JobDetails, page: u32) -> String {
    match details {
        JobDetails::Craigslist { .. } => {
            let base = url.split_once('#').map_or(url, |(base, _)| base);
            let base = strip_offset(base);
            format!(
                "{base}&s={}{}",
                page.saturating_sub(1) * CRAIGSLIST_PAGE_SIZE,
                craigslist_fragment(page)
            )
        }
        JobDetails::Facebook { .. } => url.to_string(),
    }
}

fn strip_offset(base: &str) -> &str {
    match base.rfind("&s=") {
        Some(index) if base[index + 3..].bytes().all(|b| b.is_ascii_digit()) => &base[..index],
        _ => base,
    }
}
