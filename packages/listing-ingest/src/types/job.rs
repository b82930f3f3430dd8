//! Jobs - one fetchable results page derived from a search.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::enums::{CraigslistRegion, CraigslistSubcategory, FacebookRadius, FacebookRegion, Source};

/// Coordinates of a job within its search, keyed by source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum JobDetails {
    #[serde(rename_all = "camelCase")]
    Craigslist {
        search_term: String,
        region: CraigslistRegion,
        subcategory: CraigslistSubcategory,
    },
    #[serde(rename_all = "camelCase")]
    Facebook {
        search_term: String,
        region: FacebookRegion,
        distance: FacebookRadius,
    },
}

impl JobDetails {
    pub fn source(&self) -> Source {
        match self {
            JobDetails::Craigslist { .. } => Source::Craigslist,
            JobDetails::Facebook { .. } => Source::Facebook,
        }
    }

    pub fn search_term(&self) -> &str {
        match self {
            JobDetails::Craigslist { search_term, .. } | JobDetails::Facebook { search_term, .. } => {
                search_term
            }
        }
    }

    /// Region wire value, whichever source it belongs to.
    pub fn region(&self) -> &'static str {
        match self {
            JobDetails::Craigslist { region, .. } => region.as_str(),
            JobDetails::Facebook { region, .. } => region.as_str(),
        }
    }

    pub fn subcategory(&self) -> Option<CraigslistSubcategory> {
        match self {
            JobDetails::Craigslist { subcategory, .. } => Some(*subcategory),
            JobDetails::Facebook { .. } => None,
        }
    }
}

/// One concrete fetchable unit.
///
/// Jobs live only for the duration of one ingestion run. `jid` is assigned
/// from the scheduler's counter and never reused within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub jid: u64,
    pub sid: String,
    pub alias: String,
    pub details: JobDetails,
    /// 0-based position of the search term in the search's term list.
    pub search_term_index: usize,
    /// 1-based results page.
    pub page: u32,
    pub url: String,
    pub random_wait_time: u64,
    pub search_results_home_dir: PathBuf,
}

impl Job {
    pub fn source(&self) -> Source {
        self.details.source()
    }

    /// Where this job's fetched HTML is cached.
    ///
    /// `{home}/{region}/{subcategory}/searchterm{n}_pg{page}.html`; facebook
    /// jobs have no subcategory segment.
    pub fn cache_file(&self) -> PathBuf {
        let mut path = self.search_results_home_dir.join(self.details.region());
        if let Some(subcategory) = self.details.subcategory() {
            path.push(subcategory.as_str());
        }
        path.push(format!(
            "searchterm{}_pg{}.html",
            self.search_term_index, self.page
        ));
        path
    }
}

/// `{cache_dir}/{alias}/{source-results-dir}`.
///
/// The alias always lands as one directory directly under `cache_dir`.
pub fn search_results_home_dir(cache_dir: &Path, alias: &str, source: Source) -> PathBuf {
    cache_dir.join(alias_dir_name(alias)).join(source.results_dir())
}

/// `alias` with separators and drive colons replaced, never `.` or `..`.
fn alias_dir_name(alias: &str) -> String {
    let name: String = alias
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect();
    match name.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => name,
    }
}
