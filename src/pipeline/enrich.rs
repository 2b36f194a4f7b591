// src/pipeline/enrich.rs
//
// Secondary lookup: one request per cycle resolving the cycle's content ids
// to artwork URLs. Any failure here degrades to an empty map; the cycle
// still broadcasts, with empty artUrl values.

use std::collections::HashMap;

use metrics::counter;
use tracing::warn;

use crate::pipeline::repair;
use crate::pipeline::types::{BodyFetcher, IdValue};

/// id → first artwork URL. `Some(url)` resolves, `None` marks a record that
/// exists but carries no artwork. Built fresh every cycle, never cached.
pub type LookupMap = HashMap<String, Option<String>>;

#[derive(Debug, serde::Deserialize)]
struct ArtworkDoc {
    id: Option<IdValue>,
    #[serde(default)]
    artworks: Vec<Artwork>,
}

#[derive(Debug, serde::Deserialize)]
struct Artwork {
    url: Option<String>,
}

/// Fetch artwork for `ids` (duplicates included, as collected; the lookup
/// service tolerates them). A cycle with no samples skips the request.
pub async fn fetch_artwork_map(
    fetcher: &dyn BodyFetcher,
    url_template: &str,
    ids: &[String],
) -> LookupMap {
    if ids.is_empty() {
        return LookupMap::new();
    }
    let url = url_template.replace("{mids}", &ids.join(","));
    match fetcher.fetch_text(&url).await {
        Ok(body) => build_lookup(&body),
        Err(e) => {
            warn!(error = ?e, "artwork fetch failed");
            counter!("feed_fetch_errors_total").increment(1);
            LookupMap::new()
        }
    }
}

/// Repair+parse the artwork body into the lookup map. Only the first
/// artwork of a record counts; later ones are ignored.
pub fn build_lookup(body: &str) -> LookupMap {
    let docs = match repair::parse_concat_objects(body) {
        Ok(docs) => docs,
        Err(e) => {
            warn!(error = ?e, "artwork payload unparseable");
            counter!("feed_parse_errors_total").increment(1);
            return LookupMap::new();
        }
    };

    let mut map = LookupMap::new();
    for doc in docs {
        let rec: ArtworkDoc = match serde_json::from_value(doc) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = ?e, "artwork object has unexpected shape");
                counter!("feed_parse_errors_total").increment(1);
                continue;
            }
        };
        let Some(id) = rec.id else {
            continue;
        };
        let first_url = rec.artworks.into_iter().next().and_then(|a| a.url);
        map.entry(id.into_string()).or_insert(first_url);
    }
    map
}
