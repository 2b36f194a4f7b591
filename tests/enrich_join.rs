// tests/enrich_join.rs
//
// Enrichment and join contracts: a degraded lookup never aborts the cycle,
// it only empties every artUrl; the id list goes out comma-joined with
// duplicates intact; a cycle with no samples issues no lookup at all.

use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use geoplay_feed::pipeline::enrich::{build_lookup, fetch_artwork_map};
use geoplay_feed::pipeline::join::join_artwork;
use geoplay_feed::{BodyFetcher, Sample};

struct FailingFetcher;

#[async_trait]
impl BodyFetcher for FailingFetcher {
    async fn fetch_text(&self, _url: &str) -> Result<String> {
        Err(anyhow!("simulated lookup outage"))
    }
}

struct CapturingFetcher {
    body: String,
    urls: Mutex<Vec<String>>,
}

#[async_trait]
impl BodyFetcher for CapturingFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        self.urls.lock().unwrap().push(url.to_string());
        Ok(self.body.clone())
    }
}

fn sample(id: &str) -> Sample {
    Sample {
        id: id.to_string(),
        lon: 0.0,
        lat: 0.0,
    }
}

#[tokio::test]
async fn lookup_outage_empties_every_art_url() {
    let ids = vec!["m1".to_string(), "m2".to_string()];
    let map = fetch_artwork_map(&FailingFetcher, "http://art.test/get?ids={mids}", &ids).await;
    assert!(map.is_empty());

    let out = join_artwork(vec![sample("m1"), sample("m2")], &map);
    assert_eq!(out.len(), 2);
    assert!(out.iter().all(|s| s.art_url.is_empty()));
}

#[tokio::test]
async fn id_list_is_comma_joined_with_duplicates() {
    let fetcher = CapturingFetcher {
        body: String::new(),
        urls: Mutex::new(Vec::new()),
    };
    let ids = vec!["m1".to_string(), "m2".to_string(), "m1".to_string()];
    fetch_artwork_map(&fetcher, "http://art.test/get?ids={mids}", &ids).await;

    let urls = fetcher.urls.lock().unwrap();
    assert_eq!(urls.len(), 1);
    assert!(urls[0].ends_with("ids=m1,m2,m1"), "url: {}", urls[0]);
}

#[tokio::test]
async fn zero_samples_skip_the_lookup_request() {
    let fetcher = CapturingFetcher {
        body: String::new(),
        urls: Mutex::new(Vec::new()),
    };
    let map = fetch_artwork_map(&fetcher, "http://art.test/get?ids={mids}", &[]).await;
    assert!(map.is_empty());
    assert!(fetcher.urls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn resolved_and_markerless_ids_join_as_expected() {
    let body = concat!(
        r#"{"id":"m2","artworks":[{"url":"http://img.test/m2.jpg"},{"url":"http://img.test/alt.jpg"}]}"#,
        r#"{"id":"m1","artworks":[]}"#
    );
    let lookup = build_lookup(body);

    let out = join_artwork(vec![sample("m1"), sample("m2"), sample("m3")], &lookup);
    assert_eq!(out[0].art_url, ""); // record present, artwork list empty
    assert_eq!(out[1].art_url, "http://img.test/m2.jpg"); // first artwork, deterministically
    assert_eq!(out[2].art_url, ""); // record entirely absent
}
