/*
[INPUT]:  Feed locations (http(s) URLs, file URLs, stdin) and client configuration
[OUTPUT]: Opened feed responses carrying a ByteSource body
[POS]:    Transport layer - feed opening
[UPDATE]: When adding transports or changing client behavior
*/

pub mod client;
pub mod error;
pub mod transport;

pub use error::{LogviewError, Result};
pub use transport::{FeedLocation, FeedResponse, FeedTransport};

pub use client::{ClientConfig, LogviewClient, ResponseSource};
