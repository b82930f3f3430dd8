//! Property tests for job expansion and post merging.

use proptest::prelude::*;
use proptest::sample::subsequence;
use std::collections::BTreeSet;

use listing_ingest::testing::{craigslist_post, craigslist_search, MemoryDocumentStore};
use listing_ingest::{
    CraigslistRegion, CraigslistSearchDetails, CraigslistSubcategory, IngestConfig, JidCounter,
    JobGenerator, Post, RecordStore, Search,
};

fn terms() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,8}", 1..4)
}

fn regions() -> impl Strategy<Value = Vec<&'static str>> {
    subsequence(CraigslistRegion::VALUES.to_vec(), 1..5)
}

fn subcategories() -> impl Strategy<Value = Vec<&'static str>> {
    subsequence(CraigslistSubcategory::VALUES.to_vec(), 1..4)
}

fn fragment(regions: &[&str], terms: &[String], subcategories: &[&str]) -> Post {
    let mut post = craigslist_post("123", regions[0], &terms[0], subcategories[0]);
    post.regions = regions.iter().map(|r| r.to_string()).collect();
    post.search_terms = terms.iter().cloned().collect();
    post.extras.as_mut().unwrap().subcategories =
        subcategories.iter().map(|s| s.to_string()).collect();
    post
}

fn upsert_all(fragments: &[Post]) -> Post {
    let mut store = RecordStore::open(MemoryDocumentStore::new()).unwrap();
    let search = craigslist_search();
    for post in fragments {
        store.upsert_post(post.clone(), &search).unwrap();
    }
    store.post("123").unwrap().clone()
}

proptest! {
    #[test]
    fn test_craigslist_job_count_is_cross_product(
        terms in terms(),
        regions in regions(),
        subcategories in subcategories(),
    ) {
        let search = Search::new("5", "shop").with_craigslist(CraigslistSearchDetails::new(
            terms.clone(),
            regions.iter().map(|r| r.parse::<CraigslistRegion>().unwrap()),
            subcategories.iter().map(|s| s.parse::<CraigslistSubcategory>().unwrap()),
        ));
        let generator = JobGenerator::new(&IngestConfig::default().without_pacing());
        let jobs = generator.generate(&search, &mut JidCounter::new());

        let per_term = regions.len() * subcategories.len();
        prop_assert_eq!(jobs.len(), terms.len() * per_term);
        for (index, chunk) in jobs.chunks(per_term).enumerate() {
            prop_assert!(chunk.iter().all(|j| j.search_term_index == index));
        }
        let jids: Vec<u64> = jobs.iter().map(|j| j.jid).collect();
        prop_assert!(jids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_merge_is_commutative_on_set_fields(
        regions_a in regions(),
        regions_b in regions(),
        terms_a in terms(),
        terms_b in terms(),
        subs_a in subcategories(),
        subs_b in subcategories(),
    ) {
        let a = fragment(&regions_a, &terms_a, &subs_a);
        let b = fragment(&regions_b, &terms_b, &subs_b);

        let ab = upsert_all(&[a.clone(), b.clone()]);
        let ba = upsert_all(&[b, a]);

        prop_assert_eq!(&ab.regions, &ba.regions);
        prop_assert_eq!(&ab.search_terms, &ba.search_terms);
        prop_assert_eq!(ab.extras, ba.extras);

        let expected: BTreeSet<String> = regions_a.iter().chain(&regions_b).map(|r| r.to_string()).collect();
        prop_assert_eq!(ab.regions, expected);
    }

    #[test]
    fn test_upsert_is_idempotent(
        regions in regions(),
        terms in terms(),
        subs in subcategories(),
    ) {
        let post = fragment(&regions, &terms, &subs);
        prop_assert_eq!(upsert_all(&[post.clone()]), upsert_all(&[post.clone(), post]));
    }
}
