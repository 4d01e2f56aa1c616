/*
[INPUT]:  Byte producers and NDJSON text
[OUTPUT]: ByteSource implementations and the incremental NDJSON decoder
[POS]:    Stream layer - bytes to records
[UPDATE]: When adding byte sources or changing decode behavior
*/

pub mod decoder;
pub mod source;

pub use decoder::{DecodeStats, DecodeWarning, NdjsonDecoder};
pub use source::{ByteSource, ChunkSender, ChunkSource, ReaderSource};
