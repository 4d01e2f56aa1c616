/*
[INPUT]:  CLI arguments, optional YAML configuration file, OS shutdown signals
[OUTPUT]: Streaming NDJSON viewer in a terminal UI, or headless JSON lines on stdout
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, startup flow, or shutdown handling
*/

mod headless;
mod tui;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use logview_adapter::{FeedLocation, FeedTransport, LogviewClient};
use logview_viewer::{LogBuffer, LogBufferHandle, LogWriterFactory, ViewerConfig};

#[derive(Parser, Debug)]
#[command(name = "logview-viewer", version, about = "Streaming NDJSON log viewer")]
struct Cli {
    /// Feed to open: http(s) URL, file path, file:// URL, or - for stdin
    #[arg(value_name = "URL")]
    location: Option<String>,
    #[arg(long = "url", value_name = "URL", conflicts_with = "location")]
    url: Option<String>,
    #[arg(long = "config", value_name = "PATH")]
    config_path: Option<PathBuf>,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    log_level: String,
    /// Also write logs to this file
    #[arg(long = "log-file", value_name = "PATH")]
    log_file: Option<PathBuf>,
    /// Print records to stdout instead of opening the terminal UI
    #[arg(long)]
    headless: bool,
    #[arg(long, value_name = "ROWS")]
    overscan: Option<u64>,
}

enum LogSink {
    Stderr,
    Buffer(LogBufferHandle),
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let mut config = load_config(args.config_path.as_deref())?;
    if let Some(overscan) = args.overscan {
        config.overscan = overscan;
    }

    let raw_location = args
        .url
        .clone()
        .or_else(|| args.location.clone())
        .or_else(|| config.url.clone())
        .context("no feed given: pass a URL, a file path, or - for stdin")?;
    let location = FeedLocation::parse(&raw_location).context("parse feed location")?;

    let log_buffer = LogBuffer::handle(config.log_buffer_capacity);
    let sink = if args.headless {
        LogSink::Stderr
    } else {
        LogSink::Buffer(log_buffer.clone())
    };
    let _log_guard = init_tracing(&args.log_level, sink, args.log_file.as_deref())?;

    info!(
        location = %location,
        headless = args.headless,
        overscan = config.overscan,
        "starting logview-viewer"
    );

    let client = LogviewClient::with_config(config.client_config()).context("build feed client")?;
    let transport: Arc<dyn FeedTransport> = Arc::new(client);

    let shutdown = CancellationToken::new();
    setup_signal_handlers(shutdown.clone());

    if args.headless {
        headless::run_headless(transport, location, &config, shutdown).await
    } else {
        tui::run_tui(transport, location, &config, log_buffer, shutdown).await
    }
}

fn init_tracing(
    log_level: &str,
    sink: LogSink,
    log_file: Option<&Path>,
) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;

    let console = match sink {
        LogSink::Stderr => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed(),
        LogSink::Buffer(buffer) => tracing_subscriber::fmt::layer()
            .with_writer(LogWriterFactory::new(buffer))
            .with_ansi(false)
            .boxed(),
    };

    let (file, guard) = match log_file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .context("log file path must name a file")?;
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(guard)
}

fn load_config(path: Option<&Path>) -> Result<ViewerConfig> {
    match path {
        Some(path) => ViewerConfig::from_file(path).context("load config"),
        None => ViewerConfig::load_default().context("load default config"),
    }
}

fn setup_signal_handlers(shutdown: CancellationToken) {
    let shutdown_clone = shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install SIGINT handler");
            return;
        }
        info!("received SIGINT");
        shutdown_clone.cancel();
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let shutdown_clone = shutdown.clone();
        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                    info!("received SIGTERM");
                    shutdown_clone.cancel();
                }
                Err(err) => {
                    warn!(error = %err, "failed to install SIGTERM handler");
                }
            }
        });
    }
}
