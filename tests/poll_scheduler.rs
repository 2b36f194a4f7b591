// tests/poll_scheduler.rs
//
// Scheduling contract per connection: first cycle runs immediately on
// connect, cycles never overlap, and once the consumer is gone no further
// cycle starts: advancing the (paused) clock after close produces nothing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use geoplay_feed::{
    run_poll_loop, BodyFetcher, FeedConfig, SampleSink, SinkClosed, SourceSpec,
};

/// One empty source body per call; counts how many fetches ran.
struct StubFetcher {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl BodyFetcher for StubFetcher {
    async fn fetch_text(&self, _url: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(String::new())
    }
}

/// Accepts deliveries, then reports the consumer gone during the idle wait
/// once `close_after` batches have arrived.
struct CountingSink {
    delivered: Vec<String>,
    close_after: usize,
}

#[async_trait]
impl SampleSink for CountingSink {
    async fn deliver(&mut self, payload: String) -> Result<(), SinkClosed> {
        self.delivered.push(payload);
        Ok(())
    }

    async fn idle(&mut self, interval: Duration) -> bool {
        if self.delivered.len() >= self.close_after {
            return false;
        }
        tokio::time::sleep(interval).await;
        true
    }
}

/// Fails delivery once `fail_at` is reached (consumer vanished mid-cycle).
struct FailingSink {
    delivered: Vec<String>,
    fail_at: usize,
}

#[async_trait]
impl SampleSink for FailingSink {
    async fn deliver(&mut self, payload: String) -> Result<(), SinkClosed> {
        if self.delivered.len() + 1 >= self.fail_at {
            return Err(SinkClosed);
        }
        self.delivered.push(payload);
        Ok(())
    }

    async fn idle(&mut self, interval: Duration) -> bool {
        tokio::time::sleep(interval).await;
        true
    }
}

fn test_config() -> FeedConfig {
    FeedConfig {
        sources: vec![SourceSpec {
            name: "east".to_string(),
            url_template: "http://east.test/events?since={time}".to_string(),
        }],
        artwork_url_template: "http://art.test/get?ids={mids}".to_string(),
        poll_interval_ms: 5_000,
        lookback_ms: 10_000,
    }
}

#[tokio::test(start_paused = true)]
async fn first_cycle_runs_with_zero_delay() {
    let calls = Arc::new(AtomicUsize::new(0));
    let fetcher = StubFetcher { calls: calls.clone() };
    let mut sink = CountingSink {
        delivered: Vec::new(),
        close_after: 1,
    };
    let cfg = test_config();

    let before = tokio::time::Instant::now();
    run_poll_loop(&mut sink, &fetcher, &cfg).await;

    // One immediate cycle, one broadcast, and no interval ever elapsed.
    assert_eq!(sink.delivered.len(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(tokio::time::Instant::now(), before);
}

#[tokio::test(start_paused = true)]
async fn no_cycle_starts_after_close() {
    let calls = Arc::new(AtomicUsize::new(0));
    let fetcher = StubFetcher { calls: calls.clone() };
    let mut sink = CountingSink {
        delivered: Vec::new(),
        close_after: 3,
    };
    let cfg = test_config();

    run_poll_loop(&mut sink, &fetcher, &cfg).await;

    assert_eq!(sink.delivered.len(), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    // Empty upstream bodies produce an empty batch every cycle.
    assert!(sink.delivered.iter().all(|p| p == "[]"));

    // The loop has stopped; pushing the clock well past several intervals
    // must not fire anything that was previously armed.
    tokio::time::advance(Duration::from_millis(10 * cfg.poll_interval_ms)).await;
    assert_eq!(sink.delivered.len(), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn delivery_failure_discards_the_in_flight_batch() {
    let calls = Arc::new(AtomicUsize::new(0));
    let fetcher = StubFetcher { calls: calls.clone() };
    let mut sink = FailingSink {
        delivered: Vec::new(),
        fail_at: 2,
    };
    let cfg = test_config();

    run_poll_loop(&mut sink, &fetcher, &cfg).await;

    // The second cycle ran to completion, but its output went nowhere and
    // the loop stopped instead of rescheduling.
    assert_eq!(sink.delivered.len(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
