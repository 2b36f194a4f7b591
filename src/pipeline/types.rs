// src/pipeline/types.rs
use anyhow::Result;

/// One projected "play started" event: content id plus geo coordinates.
/// Duplicates across sources are preserved; each one is a distinct play.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Sample {
    pub id: String,
    pub lon: f64,
    pub lat: f64,
}

/// `Sample` plus the artwork URL resolved for its id this cycle.
/// An empty `artUrl` on the wire means no artwork was found.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EnrichedSample {
    pub id: String,
    pub lon: f64,
    pub lat: f64,
    #[serde(rename = "artUrl")]
    pub art_url: String,
}

/// Content ids arrive as either JSON strings or bare numbers depending on
/// which upstream service produced them; both normalize to the string form.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(untagged)]
pub enum IdValue {
    Str(String),
    Num(i64),
}

impl IdValue {
    pub fn into_string(self) -> String {
        match self {
            IdValue::Str(s) => s,
            IdValue::Num(n) => n.to_string(),
        }
    }
}

#[async_trait::async_trait]
pub trait BodyFetcher: Send + Sync {
    /// Issue one GET for `url` and return the full response body as text.
    /// Connection errors, non-2xx statuses and body-read errors all surface
    /// as `Err`; callers degrade to an empty result and keep going.
    async fn fetch_text(&self, url: &str) -> Result<String>;
}
