/*
[INPUT]:  ByteSource chunks of NDJSON text (arbitrary chunk boundaries)
[OUTPUT]: Lazily decoded Records, decode stats, sampled parse warnings
[POS]:    Stream layer - incremental NDJSON decoder
[UPDATE]: When changing line resolution, warning sampling, or release semantics
*/

use std::collections::VecDeque;
use std::fmt;

use futures_util::Stream;
use serde_json::Value;
use tracing::{debug, warn};

use super::source::ByteSource;
use crate::http::error::Result;
use crate::types::Record;

const WARN_LOG_LIMIT: u64 = 20;
const RAW_LOG_MAX_BYTES: usize = 1024;

/// Counters maintained while decoding one stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Bytes received from the source
    pub bytes: u64,
    /// Lines resolved, including blank ones and the unterminated final line
    pub lines: u64,
    /// Records yielded
    pub records: u64,
    /// Empty or whitespace-only lines
    pub blank_lines: u64,
    /// Lines skipped because they did not parse into a JSON object
    pub malformed_lines: u64,
}

/// A recoverable per-line decode failure. Never aborts the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeWarning {
    /// 1-based line number within the stream
    pub line: u64,
    /// Length of the offending line in bytes
    pub bytes: usize,
    pub message: String,
}

/// Incremental NDJSON decoder over a [`ByteSource`].
///
/// State machine of `{buffer, source}`: every call to [`next_record`] either
/// returns an already resolved record or pulls one more chunk. The source is
/// owned by the decoder and dropped as soon as it reports end-of-stream or a
/// read error, or when the decoder itself is dropped.
///
/// [`next_record`]: NdjsonDecoder::next_record
pub struct NdjsonDecoder<S> {
    source: Option<S>,
    buffer: Vec<u8>,
    ready: VecDeque<Record>,
    stats: DecodeStats,
    last_warning: Option<DecodeWarning>,
}

impl<S: ByteSource> NdjsonDecoder<S> {
    pub fn new(source: S) -> Self {
        Self {
            source: Some(source),
            buffer: Vec::new(),
            ready: VecDeque::new(),
            stats: DecodeStats::default(),
            last_warning: None,
        }
    }

    pub fn stats(&self) -> DecodeStats {
        self.stats
    }

    pub fn last_warning(&self) -> Option<&DecodeWarning> {
        self.last_warning.as_ref()
    }

    /// True once the source has been released.
    pub fn is_released(&self) -> bool {
        self.source.is_none()
    }

    /// Pull the next record.
    ///
    /// Returns `Ok(None)` at end-of-stream. A transport failure is returned once
    /// as `Err`; the source is released and later calls return `Ok(None)`.
    pub async fn next_record(&mut self) -> Result<Option<Record>> {
        loop {
            if let Some(record) = self.ready.pop_front() {
                return Ok(Some(record));
            }

            let Some(source) = self.source.as_mut() else {
                return Ok(None);
            };

            match source.next_chunk().await {
                Ok(Some(chunk)) => self.ingest(&chunk),
                Ok(None) => {
                    self.release();
                    self.finish();
                }
                Err(err) => {
                    self.release();
                    self.buffer.clear();
                    return Err(err);
                }
            }
        }
    }

    /// Adapt the decoder into a `Stream` of records.
    pub fn into_stream(self) -> impl Stream<Item = Result<Record>> + Send
    where
        S: 'static,
    {
        futures_util::stream::unfold(self, |mut decoder| async move {
            match decoder.next_record().await {
                Ok(Some(record)) => Some((Ok(record), decoder)),
                Ok(None) => None,
                Err(err) => Some((Err(err), decoder)),
            }
        })
    }

    fn release(&mut self) {
        if self.source.take().is_some() {
            debug!(
                bytes = self.stats.bytes,
                lines = self.stats.lines,
                "ndjson source released"
            );
        }
    }

    fn ingest(&mut self, chunk: &[u8]) {
        self.stats.bytes += chunk.len() as u64;

        // The carried buffer never holds a newline, so scanning resumes at its end.
        let mut buffer = std::mem::take(&mut self.buffer);
        let mut cursor = buffer.len();
        let mut start = 0;
        buffer.extend_from_slice(chunk);

        while let Some(offset) = buffer[cursor..].iter().position(|&byte| byte == b'\n') {
            let end = cursor + offset;
            self.resolve_line(&buffer[start..end]);
            start = end + 1;
            cursor = start;
        }

        buffer.drain(..start);
        self.buffer = buffer;
    }

    fn finish(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let residual = std::mem::take(&mut self.buffer);
        self.resolve_line(&residual);
    }

    fn resolve_line(&mut self, raw: &[u8]) {
        self.stats.lines += 1;

        let text = String::from_utf8_lossy(raw);
        if text.trim().is_empty() {
            self.stats.blank_lines += 1;
            return;
        }

        let message = match serde_json::from_str::<Value>(&text) {
            Ok(value) => match Record::from_value(value) {
                Some(record) => {
                    self.stats.records += 1;
                    self.ready.push_back(record);
                    return;
                }
                None => "line is valid JSON but not an object".to_string(),
            },
            Err(err) => err.to_string(),
        };

        self.stats.malformed_lines += 1;
        let warning = DecodeWarning {
            line: self.stats.lines,
            bytes: raw.len(),
            message,
        };
        self.log_warning(&warning, &text);
        self.last_warning = Some(warning);
    }

    fn log_warning(&self, warning: &DecodeWarning, raw: &str) {
        let preview = truncate_for_log(raw, RAW_LOG_MAX_BYTES);
        if self.stats.malformed_lines <= WARN_LOG_LIMIT {
            warn!(
                line = warning.line,
                bytes = warning.bytes,
                error = %warning.message,
                preview = %preview,
                "failed to parse log line"
            );
        } else {
            debug!(
                line = warning.line,
                bytes = warning.bytes,
                error = %warning.message,
                malformed = self.stats.malformed_lines,
                "failed to parse log line"
            );
        }
    }
}

impl<S> fmt::Debug for NdjsonDecoder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NdjsonDecoder")
            .field("released", &self.source.is_none())
            .field("buffered_bytes", &self.buffer.len())
            .field("ready", &self.ready.len())
            .field("stats", &self.stats)
            .finish()
    }
}

fn truncate_for_log(value: &str, max_len: usize) -> String {
    if value.len() <= max_len {
        return value.to_string();
    }
    let mut cut = max_len;
    while !value.is_char_boundary(cut) {
        cut -= 1;
    }
    let mut out = String::with_capacity(cut + 3);
    out.push_str(&value[..cut]);
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::ChunkSource;

    async fn decode_all<S: ByteSource>(decoder: &mut NdjsonDecoder<S>) -> Vec<Record> {
        let mut out = Vec::new();
        while let Some(record) = decoder.next_record().await.expect("no fatal error") {
            out.push(record);
        }
        out
    }

    #[tokio::test]
    async fn decoder_skips_blank_lines_silently() {
        let source = ChunkSource::from_chunks(vec!["\n  \n{\"a\":1}\n\t\n"]);
        let mut decoder = NdjsonDecoder::new(source);
        let records = decode_all(&mut decoder).await;

        assert_eq!(records.len(), 1);
        let stats = decoder.stats();
        assert_eq!(stats.blank_lines, 3);
        assert_eq!(stats.malformed_lines, 0);
        assert!(decoder.last_warning().is_none());
    }

    #[tokio::test]
    async fn decoder_records_warning_for_malformed_and_non_object_lines() {
        let source = ChunkSource::from_chunks(vec!["{\"a\":1}\nnot json\n[1,2]\n{\"a\":2}\n"]);
        let mut decoder = NdjsonDecoder::new(source);
        let records = decode_all(&mut decoder).await;

        assert_eq!(records.len(), 2);
        assert_eq!(decoder.stats().malformed_lines, 2);
        let warning = decoder.last_warning().expect("warning recorded");
        assert_eq!(warning.line, 3);
        assert_eq!(warning.bytes, 5);
    }

    #[tokio::test]
    async fn decoder_releases_source_at_end_of_stream() {
        let (sender, source) = ChunkSource::channel();
        sender.send("{\"a\":1}");
        drop(sender);

        let mut decoder = NdjsonDecoder::new(source);
        assert!(!decoder.is_released());
        let records = decode_all(&mut decoder).await;
        assert_eq!(records.len(), 1);
        assert!(decoder.is_released());
        assert!(decoder.next_record().await.expect("still ok").is_none());
    }

    #[tokio::test]
    async fn decoder_reports_read_error_once_and_releases() {
        let (sender, source) = ChunkSource::channel();
        sender.send("{\"a\":1}\n{\"a\":");
        sender.fail(std::io::Error::other("connection reset"));

        let mut decoder = NdjsonDecoder::new(source);
        let first = decoder.next_record().await.expect("first record");
        assert!(first.is_some());

        let err = decoder.next_record().await.expect_err("read error surfaces");
        assert!(err.is_transport_error());
        assert!(decoder.is_released());
        assert!(sender.is_released());
        assert!(decoder.next_record().await.expect("after error").is_none());
    }

    #[test]
    fn truncate_for_log_respects_char_boundaries() {
        let text = "ééé";
        assert_eq!(truncate_for_log(text, 3), "é...");
        assert_eq!(truncate_for_log("short", 10), "short");
    }
}
