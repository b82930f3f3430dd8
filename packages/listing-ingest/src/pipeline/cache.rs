//! Fetched HTML cache.

use std::io;
use std::path::PathBuf;
use tracing::debug;

use crate::types::job::Job;

/// Write `html` to the job's cache file, creating directories as needed.
///
/// The path is deterministic, so re-fetching a page overwrites it.
pub async fn cache_page(job: &Job, html: &str) -> io::Result<PathBuf> {
    let path = job.cache_file();
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, html).await?;
    debug!(jid = job.jid, path = %path.display(), bytes = html.len(), "page cached");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::{JidCounter, JobGenerator};
    use crate::testing::craigslist_search;
    use crate::types::config::IngestConfig;

    #[tokio::test]
    async fn test_writes_and_overwrites_cache_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = IngestConfig::default()
            .with_cache_dir(dir.path())
            .without_pacing();
        let job = JobGenerator::new(&config)
            .generate(&craigslist_search(), &mut JidCounter::new())
            .remove(1);

        let path = cache_page(&job, "<p>first</p>").await.unwrap();
        assert_eq!(
            path,
            dir.path()
                .join("shop-tools/craigslist-results/modesto/tools/searchterm0_pg1.html")
        );

        cache_page(&job, "<p>second</p>").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<p>second</p>");
    }
}
