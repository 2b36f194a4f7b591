// src/pipeline/join.rs
use crate::pipeline::enrich::LookupMap;
use crate::pipeline::types::{EnrichedSample, Sample};

/// Merge samples with the cycle's artwork map. Pure and stable: output order
/// matches input order exactly, nothing is filtered. A sample whose id is
/// absent from the map, or mapped to the no-artwork marker, gets `""`.
pub fn join_artwork(samples: Vec<Sample>, lookup: &LookupMap) -> Vec<EnrichedSample> {
    samples
        .into_iter()
        .map(|s| {
            let art_url = lookup
                .get(&s.id)
                .and_then(|u| u.clone())
                .unwrap_or_default();
            EnrichedSample {
                id: s.id,
                lon: s.lon,
                lat: s.lat,
                art_url,
            }
        })
        .collect()
}
