/*
[INPUT]:  FeedLocation, injected FeedTransport, FrameScheduler, CancellationToken
[OUTPUT]: Watch channel of FeedState (records, status, decode stats) per subscription
[POS]:    Feed layer - decoder-to-batcher driver and feed lifecycle
[UPDATE]: When changing status transitions, re-subscription, or teardown semantics
*/

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Result, anyhow};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use logview_adapter::{DecodeStats, FeedLocation, FeedTransport, Record};

use crate::batcher::{BatchCloser, FrameBatcher, FrameScheduler, lock};
use crate::metrics::{FeedMetrics, FeedMetricsSnapshot};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedStatus {
    /// Subscribed, nothing delivered yet
    Loading,
    /// At least one batch delivered, stream still open
    Streaming,
    Complete,
    Errored { reason: String },
}

impl FeedStatus {
    /// True while the feed may still deliver records.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading | Self::Streaming)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_loading()
    }

    pub fn error_reason(&self) -> Option<&str> {
        match self {
            Self::Errored { reason } => Some(reason),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Streaming => "streaming",
            Self::Complete => "complete",
            Self::Errored { .. } => "error",
        }
    }
}

/// Records received so far plus the feed's lifecycle status.
#[derive(Debug, Clone)]
pub struct FeedState {
    records: Vec<Record>,
    status: FeedStatus,
    decode: DecodeStats,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            status: FeedStatus::Loading,
            decode: DecodeStats::default(),
        }
    }
}

impl FeedState {
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn status(&self) -> &FeedStatus {
        &self.status
    }

    pub fn decode_stats(&self) -> DecodeStats {
        self.decode
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Completed without delivering a single record.
    pub fn is_empty_feed(&self) -> bool {
        self.status == FeedStatus::Complete && self.records.is_empty()
    }

    /// Append one flushed batch. Ignored once the feed is terminal.
    pub(crate) fn append_batch(&mut self, batch: Vec<Record>, decode: DecodeStats) -> bool {
        if self.status.is_terminal() {
            warn!(
                dropped = batch.len(),
                status = self.status.label(),
                "batch arrived after terminal status"
            );
            return false;
        }
        self.decode = decode;
        if batch.is_empty() {
            return false;
        }
        self.records.extend(batch);
        self.status = FeedStatus::Streaming;
        true
    }

    pub(crate) fn complete(&mut self, decode: DecodeStats) {
        if self.status.is_terminal() {
            return;
        }
        self.decode = decode;
        self.status = FeedStatus::Complete;
    }

    pub(crate) fn fail(&mut self, reason: String, decode: DecodeStats) {
        if self.status.is_terminal() {
            return;
        }
        self.decode = decode;
        self.status = FeedStatus::Errored { reason };
    }
}

/// How a feed driver task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedOutcome {
    Complete { records: u64 },
    Errored { reason: String },
    Cancelled,
}

/// One running feed: a driver task publishing into its own state channel.
///
/// Cancelling (or dropping) the subscription closes its batcher on the spot, so
/// the state is frozen before `cancel` returns. The driver then stops pulling
/// from the decoder and releases the byte source on its next wakeup.
pub struct FeedSubscription {
    location: FeedLocation,
    state: watch::Receiver<FeedState>,
    metrics: Arc<Mutex<FeedMetrics>>,
    shutdown: CancellationToken,
    closer: BatchCloser,
    handle: Option<JoinHandle<FeedOutcome>>,
}

impl FeedSubscription {
    /// Spawn the driver task on the current tokio runtime.
    pub fn spawn(
        location: FeedLocation,
        transport: Arc<dyn FeedTransport>,
        scheduler: Arc<dyn FrameScheduler>,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(FeedState::default());
        let metrics = Arc::new(Mutex::new(FeedMetrics::new()));
        let shutdown = CancellationToken::new();
        let state = Arc::new(state_tx);
        let decode = Arc::new(Mutex::new(DecodeStats::default()));

        let batcher = feed_batcher(
            state.clone(),
            decode.clone(),
            metrics.clone(),
            shutdown.clone(),
            scheduler,
        );
        let closer = batcher.closer();

        let driver = FeedDriver {
            location: location.clone(),
            transport,
            state,
            decode,
            metrics: metrics.clone(),
            shutdown: shutdown.clone(),
        };
        let handle = tokio::spawn(driver.run(batcher));

        Self {
            location,
            state: state_rx,
            metrics,
            shutdown,
            closer,
            handle: Some(handle),
        }
    }

    pub fn location(&self) -> &FeedLocation {
        &self.location
    }

    /// A fresh receiver for this subscription's state.
    pub fn state(&self) -> watch::Receiver<FeedState> {
        self.state.clone()
    }

    pub fn metrics(&self) -> FeedMetricsSnapshot {
        lock(&self.metrics).snapshot()
    }

    /// Tear the feed down. Pending records are discarded and no later frame
    /// tick can reach this subscription's state.
    pub fn cancel(&self) {
        self.shutdown.cancel();
        let dropped = self.closer.close();
        if dropped > 0 {
            debug!(location = %self.location, dropped, "pending records discarded on cancel");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.handle
            .as_ref()
            .map(JoinHandle::is_finished)
            .unwrap_or(true)
    }

    /// Wait for the driver to end on its own and return its outcome.
    pub async fn join(mut self) -> Result<FeedOutcome> {
        let Some(handle) = self.handle.take() else {
            return Err(anyhow!("feed already joined"));
        };
        handle
            .await
            .map_err(|err| anyhow!("feed driver join error: {err}"))
    }

    /// Cancel and wait up to `timeout` for the driver to finish teardown.
    pub async fn shutdown(mut self, timeout: Duration) -> Result<FeedOutcome> {
        self.cancel();
        let Some(mut handle) = self.handle.take() else {
            return Ok(FeedOutcome::Cancelled);
        };

        tokio::select! {
            res = &mut handle => {
                res.map_err(|err| anyhow!("feed driver join error: {err}"))
            }
            _ = tokio::time::sleep(timeout) => {
                handle.abort();
                Err(anyhow!("feed shutdown timed out after {timeout:?}"))
            }
        }
    }
}

impl Drop for FeedSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for FeedSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedSubscription")
            .field("location", &self.location)
            .field("cancelled", &self.shutdown.is_cancelled())
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// Batcher whose flushes append to `state`, unless the feed was cancelled.
///
/// Lock order on a flush: batch, decode stats, state, metrics.
fn feed_batcher(
    state: Arc<watch::Sender<FeedState>>,
    decode: Arc<Mutex<DecodeStats>>,
    metrics: Arc<Mutex<FeedMetrics>>,
    shutdown: CancellationToken,
    scheduler: Arc<dyn FrameScheduler>,
) -> FrameBatcher<Record> {
    FrameBatcher::with_scheduler(
        move |batch: Vec<Record>| {
            if shutdown.is_cancelled() {
                return;
            }
            let stats = *lock(&decode);
            let size = batch.len();
            let mut appended = false;
            state.send_modify(|feed| {
                appended = feed.append_batch(batch, stats);
            });
            if appended {
                lock(&metrics).record_batch(size);
            }
        },
        scheduler,
    )
}

struct FeedDriver {
    location: FeedLocation,
    transport: Arc<dyn FeedTransport>,
    state: Arc<watch::Sender<FeedState>>,
    decode: Arc<Mutex<DecodeStats>>,
    metrics: Arc<Mutex<FeedMetrics>>,
    shutdown: CancellationToken,
}

impl FeedDriver {
    async fn run(self, batcher: FrameBatcher<Record>) -> FeedOutcome {
        info!(location = %self.location, "feed subscription started");

        let result = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => None,
            res = self.pump(&batcher) => Some(res),
        };

        let stats = *lock(&self.decode);
        if self.shutdown.is_cancelled() {
            let dropped = batcher.close();
            info!(
                location = %self.location,
                dropped,
                records = stats.records,
                "feed subscription cancelled"
            );
            return FeedOutcome::Cancelled;
        }

        batcher.flush_now();
        batcher.close();
        lock(&self.metrics).record_finished();

        match result {
            Some(Ok(())) => {
                self.state.send_modify(|feed| feed.complete(stats));
                info!(
                    location = %self.location,
                    records = stats.records,
                    malformed = stats.malformed_lines,
                    bytes = stats.bytes,
                    "feed complete"
                );
                FeedOutcome::Complete {
                    records: stats.records,
                }
            }
            Some(Err(err)) => {
                let reason = err.to_string();
                self.state
                    .send_modify(|feed| feed.fail(reason.clone(), stats));
                warn!(
                    location = %self.location,
                    records = stats.records,
                    error = %reason,
                    "feed failed"
                );
                FeedOutcome::Errored { reason }
            }
            None => FeedOutcome::Cancelled,
        }
    }

    async fn pump(&self, batcher: &FrameBatcher<Record>) -> logview_adapter::Result<()> {
        let mut decoder = self.transport.open_records(&self.location).await?;
        debug!(location = %self.location, "feed opened");

        loop {
            let next = decoder.next_record().await;
            *lock(&self.decode) = decoder.stats();
            match next? {
                Some(record) => batcher.push(record),
                None => return Ok(()),
            }
        }
    }
}

/// Owns the current subscription; subscribing again replaces it.
pub struct FeedController {
    transport: Arc<dyn FeedTransport>,
    scheduler: Arc<dyn FrameScheduler>,
    current: Option<FeedSubscription>,
}

impl FeedController {
    pub fn new(transport: Arc<dyn FeedTransport>, scheduler: Arc<dyn FrameScheduler>) -> Self {
        Self {
            transport,
            scheduler,
            current: None,
        }
    }

    /// Start streaming `location`, abandoning any previous subscription.
    pub fn subscribe(&mut self, location: FeedLocation) -> watch::Receiver<FeedState> {
        if let Some(previous) = self.current.take() {
            info!(
                previous = %previous.location(),
                next = %location,
                "replacing feed subscription"
            );
            previous.cancel();
        }

        let subscription =
            FeedSubscription::spawn(location, self.transport.clone(), self.scheduler.clone());
        let state = subscription.state();
        self.current = Some(subscription);
        state
    }

    /// Re-subscribe to the current location from scratch.
    pub fn restart(&mut self) -> Option<watch::Receiver<FeedState>> {
        let location = self.current.as_ref()?.location().clone();
        Some(self.subscribe(location))
    }

    pub fn current(&self) -> Option<&FeedSubscription> {
        self.current.as_ref()
    }

    pub fn metrics(&self) -> Option<FeedMetricsSnapshot> {
        self.current.as_ref().map(FeedSubscription::metrics)
    }

    pub fn unsubscribe(&mut self) {
        if let Some(previous) = self.current.take() {
            previous.cancel();
        }
    }

    /// Cancel the current subscription and wait for its teardown.
    pub async fn shutdown(&mut self) -> Result<()> {
        let Some(subscription) = self.current.take() else {
            return Ok(());
        };
        let outcome = subscription.shutdown(SHUTDOWN_TIMEOUT).await?;
        debug!(?outcome, "feed controller shut down");
        Ok(())
    }
}

/// Wait until the feed reaches `Complete` or `Errored` and return that state.
pub async fn wait_terminal(state: &mut watch::Receiver<FeedState>) -> Result<FeedState> {
    let feed = state
        .wait_for(|feed| feed.status().is_terminal())
        .await
        .map_err(|_| anyhow!("feed state channel closed before a terminal status"))?;
    Ok(feed.clone())
}
