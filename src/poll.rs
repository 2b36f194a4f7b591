// src/poll.rs
//
// Per-connection poll loop. Each consumer connection owns one instance of
// this loop; connections share no mutable state, so one consumer's upstream
// failures never affect another's cadence.

use std::time::Duration;

use async_trait::async_trait;
use metrics::counter;
use tracing::debug;

use crate::pipeline;
use crate::pipeline::config::FeedConfig;
use crate::pipeline::types::BodyFetcher;

/// Returned by `SampleSink::deliver` when the consumer is gone.
#[derive(Debug, PartialEq, Eq)]
pub struct SinkClosed;

/// Where a finished cycle's payload goes. The WebSocket session implements
/// this; tests substitute recording sinks.
#[async_trait]
pub trait SampleSink: Send {
    /// Deliver one serialized batch as a single text message.
    async fn deliver(&mut self, payload: String) -> Result<(), SinkClosed>;

    /// Wait out the poll interval. Returns `false` when the consumer went
    /// away while waiting; the pending wait is abandoned and nothing more
    /// runs for this connection.
    async fn idle(&mut self, interval: Duration) -> bool;
}

/// Drive one connection until it closes. The first cycle runs immediately;
/// every later cycle is armed only after the previous broadcast attempt
/// finished, so cycles for one connection never overlap. A cycle whose
/// consumer disappeared mid-flight completes and its output is discarded.
pub async fn run_poll_loop(
    sink: &mut dyn SampleSink,
    fetcher: &dyn BodyFetcher,
    cfg: &FeedConfig,
) {
    loop {
        let batch = pipeline::run_cycle(fetcher, cfg).await;
        let payload = match serde_json::to_string(&batch) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(error = ?e, "batch serialization failed");
                return;
            }
        };

        if sink.deliver(payload).await.is_err() {
            debug!("consumer gone before delivery, stopping poll loop");
            return;
        }
        counter!("feed_broadcasts_total").increment(1);

        if !sink.idle(cfg.poll_interval()).await {
            debug!("consumer gone while idle, stopping poll loop");
            return;
        }
    }
}
