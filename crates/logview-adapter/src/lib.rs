/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public logview adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod http;
pub mod stream;
pub mod types;

// Re-export commonly used types from http
pub use http::{
    ClientConfig,
    FeedLocation,
    FeedResponse,
    FeedTransport,
    LogviewClient,
    LogviewError,
    ResponseSource,
    Result,
};

// Re-export commonly used types from stream
pub use stream::{
    ByteSource,
    ChunkSender,
    ChunkSource,
    DecodeStats,
    DecodeWarning,
    NdjsonDecoder,
    ReaderSource,
};

// Re-export all types
pub use types::*;
