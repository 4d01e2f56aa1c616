/*
[INPUT]:  Scripted feed responses and mock server requirements
[OUTPUT]: Shared test transports, fixtures, and wait helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for logview-viewer tests

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use logview_adapter::{
    ChunkSource, FeedLocation, FeedResponse, FeedTransport, LogviewError, Record, Result,
};
use logview_viewer::FeedState;
use tokio::sync::watch;
use wiremock::MockServer;

pub const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Transport that hands out queued responses in order, one per open.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<FeedResponse>>>,
    opened: AtomicUsize,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(source: ChunkSource) -> Self {
        let transport = Self::new();
        transport.push_source(source);
        transport
    }

    pub fn push_source(&self, source: ChunkSource) {
        self.responses
            .lock()
            .expect("responses lock")
            .push_back(Ok(FeedResponse::ok(source)));
    }

    pub fn push_error(&self, err: LogviewError) {
        self.responses
            .lock()
            .expect("responses lock")
            .push_back(Err(err));
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedTransport for ScriptedTransport {
    async fn open(&self, _location: &FeedLocation) -> Result<FeedResponse> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or(Err(LogviewError::MissingBody))
    }
}

/// Setup a mock HTTP server for testing
#[allow(dead_code)]
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

#[allow(dead_code)]
pub fn location() -> FeedLocation {
    FeedLocation::parse("scripted.ndjson").expect("location")
}

/// NDJSON document with `count` records shaped like the production feed
#[allow(dead_code)]
pub fn ndjson_fixture(count: usize) -> String {
    (0..count)
        .map(|i| {
            format!(
                "{{\"_time\":\"{}\",\"cid\":\"api\",\"message\":\"m{}\"}}\n",
                1_724_323_612_592_u64 + i as u64,
                i
            )
        })
        .collect()
}

/// Wait until `predicate` holds for the published feed state.
#[allow(dead_code)]
pub async fn wait_for_state<F>(feed: &mut watch::Receiver<FeedState>, predicate: F) -> FeedState
where
    F: FnMut(&FeedState) -> bool,
{
    tokio::time::timeout(WAIT_TIMEOUT, feed.wait_for(predicate))
        .await
        .expect("state reached before timeout")
        .expect("state channel open")
        .clone()
}

/// Poll `condition` until it holds or the timeout expires.
#[allow(dead_code)]
pub async fn eventually<F>(mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + WAIT_TIMEOUT;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}

#[allow(dead_code)]
pub fn messages(state: &FeedState) -> Vec<String> {
    state
        .records()
        .iter()
        .map(|record: &Record| {
            record
                .get("message")
                .and_then(|value| value.as_str())
                .unwrap_or_default()
                .to_string()
        })
        .collect()
}
