//! End-to-end ingestion runs against canned pages.

use listing_ingest::jobs::craigslist_url;
use listing_ingest::testing::{
    craigslist_listing_html, craigslist_results_html, craigslist_search, MemoryDocumentStore,
    MockBrowser,
};
use listing_ingest::{
    CraigslistRegion, CraigslistSubcategory, IngestConfig, Ingestion, JsonFileStore, RecordStore,
    Search,
};
use serde_json::{json, Value};

fn url(region: CraigslistRegion, page: u32) -> String {
    craigslist_url("drill", region, CraigslistSubcategory::Tools, None, None, page)
}

fn seeded_store(searches: &[Search]) -> MemoryDocumentStore {
    let documents: serde_json::Map<String, Value> = searches
        .iter()
        .map(|s| (s.sid.clone(), serde_json::to_value(s).unwrap()))
        .collect();
    MemoryDocumentStore::new().with_document("searches", Value::Object(documents).to_string())
}

fn listings(items: &[(&str, &str, &str)]) -> Vec<String> {
    items
        .iter()
        .map(|(pid, title, price)| craigslist_listing_html(pid, title, price))
        .collect()
}

/// reno has two pages, modesto one; listing 101 shows up in both regions.
fn two_region_browser() -> MockBrowser {
    MockBrowser::new()
        .with_page(
            url(CraigslistRegion::Reno, 1),
            craigslist_results_html(
                "1 - 2 of 3",
                &listings(&[("101", "Drill", "$40"), ("102", "Drill press", "$150")]),
            ),
        )
        .with_page(
            url(CraigslistRegion::Reno, 2),
            craigslist_results_html("3 - 3 of 3", &listings(&[("103", "Drill bits", "$5")])),
        )
        .with_page(
            url(CraigslistRegion::Modesto, 1),
            craigslist_results_html(
                "1 - 2 of 2",
                &listings(&[("101", "Drill", "$35"), ("104", "Hammer drill", "$1,100")]),
            ),
        )
}

#[tokio::test]
async fn test_full_run_follows_pagination_and_merges() {
    let cache = tempfile::tempdir().unwrap();
    let config = IngestConfig::default()
        .with_cache_dir(cache.path())
        .without_pacing();

    let backend = seeded_store(&[craigslist_search()]);
    let browser = two_region_browser();
    let store = RecordStore::open(backend.clone()).unwrap();

    let mut ingestion = Ingestion::new(&config, browser.clone(), store);
    let summary = ingestion.run().await;

    assert_eq!(summary.searches, 1);
    assert_eq!(summary.jobs_queued, 2);
    assert_eq!(summary.report.executed, 3);
    assert_eq!(summary.report.continuations, 1);
    assert!(summary.is_success());
    assert_eq!(summary.new_posts(), 4);

    // continuation runs directly after the page that reported more results
    assert_eq!(
        browser.calls(),
        vec![
            url(CraigslistRegion::Reno, 1),
            url(CraigslistRegion::Reno, 2),
            url(CraigslistRegion::Modesto, 1)
        ]
    );

    let store = ingestion.store();
    let merged = store.post("101").unwrap();
    assert_eq!(merged.regions.iter().collect::<Vec<_>>(), vec!["modesto", "reno"]);
    assert_eq!(merged.price, 35.0);
    assert_eq!(merged.price_str, "$35");

    // one write per successful upsert
    assert_eq!(backend.write_count(), 5);
    let persisted: Value = serde_json::from_str(&backend.document("posts").unwrap()).unwrap();
    assert_eq!(persisted["104"]["priceStr"], json!("$1,100"));
    assert_eq!(persisted["104"]["extras"]["subcategories"], json!(["tools"]));

    let cached = cache
        .path()
        .join("shop-tools/craigslist-results/reno/tools/searchterm0_pg2.html");
    assert!(std::fs::read_to_string(cached).unwrap().contains("Drill bits"));
}

#[tokio::test]
async fn test_failed_fetch_does_not_stop_run() {
    let cache = tempfile::tempdir().unwrap();
    let config = IngestConfig::default()
        .with_cache_dir(cache.path())
        .without_pacing();

    let browser = MockBrowser::new()
        .with_failure(url(CraigslistRegion::Reno, 1))
        .with_page(
            url(CraigslistRegion::Modesto, 1),
            craigslist_results_html("1 - 1 of 1", &listings(&[("201", "Drill", "$20")])),
        );
    let store = RecordStore::open(seeded_store(&[craigslist_search()])).unwrap();

    let mut ingestion = Ingestion::new(&config, browser.clone(), store);
    let summary = ingestion.run().await;

    assert_eq!(summary.report.executed, 2);
    assert_eq!(summary.report.failed, 1);
    assert!(!summary.is_success());
    assert_eq!(browser.calls().len(), 2, "no retry by default");
    assert!(ingestion.store().post("201").is_some());
}

#[tokio::test]
async fn test_retries_failing_job() {
    let cache = tempfile::tempdir().unwrap();
    let config = IngestConfig::default()
        .with_cache_dir(cache.path())
        .without_pacing()
        .with_max_retries(2);

    let browser = MockBrowser::new().with_failure(url(CraigslistRegion::Reno, 1));
    let search = Search::new("5", "shop-tools").with_craigslist(
        listing_ingest::CraigslistSearchDetails::new(
            ["drill"],
            [CraigslistRegion::Reno],
            [CraigslistSubcategory::Tools],
        ),
    );
    let store = RecordStore::open(seeded_store(&[search])).unwrap();

    let summary = Ingestion::new(&config, browser.clone(), store).run().await;
    assert_eq!(summary.report.failed, 1);
    assert_eq!(browser.calls().len(), 3);
}

#[tokio::test]
async fn test_page_without_banner_fails_job_without_continuation() {
    let cache = tempfile::tempdir().unwrap();
    let config = IngestConfig::default()
        .with_cache_dir(cache.path())
        .without_pacing();

    let browser = MockBrowser::new()
        .with_page(
            url(CraigslistRegion::Reno, 1),
            "<html><body><p>Please verify you are human</p></body></html>",
        )
        .with_page(
            url(CraigslistRegion::Modesto, 1),
            craigslist_results_html("1 - 0 of 0", &[]),
        );
    let backend = seeded_store(&[craigslist_search()]);
    let store = RecordStore::open(backend.clone()).unwrap();

    let summary = Ingestion::new(&config, browser, store).run().await;
    assert_eq!(summary.report.failed, 1);
    assert_eq!(summary.report.continuations, 0);
    assert_eq!(backend.write_count(), 0);
}

#[tokio::test]
async fn test_invalid_listing_rejected_siblings_kept() {
    let cache = tempfile::tempdir().unwrap();
    let config = IngestConfig::default()
        .with_cache_dir(cache.path())
        .without_pacing();

    let browser = MockBrowser::new()
        .with_page(
            url(CraigslistRegion::Reno, 1),
            craigslist_results_html(
                "1 - 2 of 2",
                &listings(&[("301", "", "$10"), ("302", "Drill", "$10")]),
            ),
        )
        .with_page(
            url(CraigslistRegion::Modesto, 1),
            craigslist_results_html("0 - 0 of 0", &[]),
        );
    let store = RecordStore::open(seeded_store(&[craigslist_search()])).unwrap();

    let mut ingestion = Ingestion::new(&config, browser, store);
    let summary = ingestion.run().await;

    assert!(summary.is_success());
    assert_eq!(summary.rejected_listings, 1);
    assert!(ingestion.store().post("301").is_none());
    assert!(ingestion.store().post("302").is_some());
}

#[tokio::test]
async fn test_disabled_and_missing_searches_make_empty_run() {
    let config = IngestConfig::default().without_pacing();
    let browser = MockBrowser::new();

    let store = RecordStore::open(seeded_store(&[craigslist_search().disabled()])).unwrap();
    let summary = Ingestion::new(&config, browser.clone(), store).run().await;
    assert_eq!(summary.jobs_queued, 0);
    assert_eq!(summary.report.executed, 0);

    let store = RecordStore::open(MemoryDocumentStore::new()).unwrap();
    let summary = Ingestion::new(&config, browser.clone(), store).run().await;
    assert_eq!(summary.searches, 0);
    assert!(browser.calls().is_empty());
}

#[tokio::test]
async fn test_json_file_store_round_trip() {
    let data = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    let config = IngestConfig::default()
        .with_cache_dir(cache.path())
        .with_data_dir(data.path())
        .without_pacing();

    let searches = json!({ "5": serde_json::to_value(craigslist_search()).unwrap() });
    std::fs::write(data.path().join("searches.json"), searches.to_string()).unwrap();

    let store = RecordStore::open(JsonFileStore::new(&config.data_dir)).unwrap();
    Ingestion::new(&config, two_region_browser(), store).run().await;

    let reopened = RecordStore::open(JsonFileStore::new(&config.data_dir)).unwrap();
    assert_eq!(reopened.post_count(), 4);
    assert_eq!(
        reopened.post("101").unwrap().regions.iter().collect::<Vec<_>>(),
        vec!["modesto", "reno"]
    );
}
