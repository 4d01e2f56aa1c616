/*
[INPUT]:  Feed transport and location, viewer config, shutdown token
[OUTPUT]: Flushed records as compact JSON lines on stdout; error on fatal feed failure
[POS]:    Headless runner - feed controller without a terminal UI
[UPDATE]: When changing headless output format or exit behavior
*/

use std::io::{self, BufWriter, Write};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use logview_adapter::{FeedLocation, FeedTransport};
use logview_viewer::{FeedController, FeedStatus, IntervalScheduler, ViewerConfig};

pub async fn run_headless(
    transport: Arc<dyn FeedTransport>,
    location: FeedLocation,
    config: &ViewerConfig,
    shutdown: CancellationToken,
) -> Result<()> {
    let scheduler = Arc::new(IntervalScheduler::new(config.frame_interval()));
    let mut controller = FeedController::new(transport, scheduler);
    let mut feed = controller.subscribe(location.clone());
    let mut out = BufWriter::new(io::stdout().lock());
    let mut printed = 0usize;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!(printed, "headless run interrupted");
                controller.shutdown().await?;
                return Ok(());
            }
            changed = feed.changed() => {
                if changed.is_err() {
                    bail!("feed for {location} ended without a terminal status");
                }
            }
        }

        let status = {
            let state = feed.borrow_and_update();
            for record in &state.records()[printed..] {
                writeln!(out, "{}", record.to_compact_json()).context("write record")?;
            }
            printed = state.len();
            state.status().clone()
        };
        out.flush().context("flush stdout")?;

        match status {
            FeedStatus::Complete => {
                info!(records = printed, "headless run complete");
                return Ok(());
            }
            FeedStatus::Errored { reason } => {
                warn!(records = printed, error = %reason, "headless run failed");
                bail!("Error loading logs: {reason}");
            }
            FeedStatus::Loading | FeedStatus::Streaming => {}
        }
    }
}
