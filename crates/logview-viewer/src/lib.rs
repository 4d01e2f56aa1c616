/*
[INPUT]:  Public API exports for logview-viewer crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod batcher;
pub mod config;
pub mod feed;
pub mod log_buffer;
pub mod metrics;
pub mod window;

// Re-export main types for convenience
pub use batcher::{BatchCloser, FrameBatcher, FrameQueue, FrameScheduler, IntervalScheduler};
pub use config::ViewerConfig;
pub use feed::{FeedController, FeedOutcome, FeedState, FeedStatus, FeedSubscription};
pub use log_buffer::{LogBuffer, LogBufferHandle, LogWriterFactory};
pub use metrics::FeedMetricsSnapshot;
pub use window::{Viewport, WindowLayout, WindowRange, WindowState, compute_window};
