// src/pipeline/config.rs
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PATH: &str = "GEOPLAY_SOURCES_PATH";
const DEFAULT_PATH: &str = "config/sources.toml";

/// One regional play-event source. The template's `{time}` placeholder is
/// substituted with the lookback window's lower bound (epoch milliseconds)
/// on every cycle; `{env}` is substituted once at startup.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct SourceSpec {
    pub name: String,
    pub url_template: String,
}

/// Feed configuration. Source order is significant: aggregation output
/// concatenates per-source samples in this order, not by arrival time.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct FeedConfig {
    pub sources: Vec<SourceSpec>,
    /// `{mids}` placeholder takes the comma-joined id list of the cycle.
    pub artwork_url_template: String,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_lookback_ms")]
    pub lookback_ms: i64,
}

fn default_poll_interval_ms() -> u64 {
    5_000
}

fn default_lookback_ms() -> i64 {
    10_000
}

impl Default for FeedConfig {
    fn default() -> Self {
        let region = |name: &str| SourceSpec {
            name: name.to_string(),
            url_template: format!(
                "http://citools.{name}.{{env}}.example.net/clientinfo/api/esi/logblobs\
                 ?logblobTypes=startplay&lastN=100&startSearchTimestampMsec={{time}}&isGeoMap=true"
            ),
        };
        Self {
            sources: vec![region("us-east-1"), region("us-west-2"), region("eu-west-1")],
            artwork_url_template:
                "http://art.{env}.example.net:7001/getArtWork?videoIds={mids}&widths=200&types=sdp"
                    .to_string(),
            poll_interval_ms: default_poll_interval_ms(),
            lookback_ms: default_lookback_ms(),
        }
    }
}

impl FeedConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Load from an explicit TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading source config from {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("parsing source config from {}", path.display()))
    }

    /// Load using env var + fallbacks:
    /// 1) $GEOPLAY_SOURCES_PATH
    /// 2) config/sources.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("GEOPLAY_SOURCES_PATH points to non-existent path"));
        }
        let default_p = PathBuf::from(DEFAULT_PATH);
        if default_p.exists() {
            return Self::load_from(&default_p);
        }
        Ok(Self::default())
    }

    /// Substitute the `{env}` placeholder in every URL template. Run once at
    /// startup, before `validate`.
    pub fn substitute_env(&mut self, environment: &str) {
        for spec in &mut self.sources {
            spec.url_template = spec.url_template.replace("{env}", environment);
        }
        self.artwork_url_template = self.artwork_url_template.replace("{env}", environment);
    }

    /// Startup-fatal configuration checks. Everything else degrades at
    /// runtime, but a template without its placeholder can never work.
    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(anyhow!("no sources configured"));
        }
        for spec in &self.sources {
            if !spec.url_template.contains("{time}") {
                return Err(anyhow!(
                    "source '{}' template is missing the {{time}} placeholder",
                    spec.name
                ));
            }
        }
        if !self.artwork_url_template.contains("{mids}") {
            return Err(anyhow!(
                "artwork template is missing the {{mids}} placeholder"
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(anyhow!("poll_interval_ms must be positive"));
        }
        Ok(())
    }
}
