// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod metrics;
pub mod pipeline;
pub mod poll;
pub mod proxy;
pub mod ws;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::pipeline::config::{FeedConfig, SourceSpec};
pub use crate::pipeline::types::{BodyFetcher, EnrichedSample, Sample};
pub use crate::poll::{run_poll_loop, SampleSink, SinkClosed};
