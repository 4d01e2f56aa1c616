/*
[INPUT]:  Raw byte producers (HTTP bodies, files, stdin, in-memory chunk scripts)
[OUTPUT]: ByteSource trait yielding chunks until end-of-stream
[POS]:    Stream layer - byte source abstraction
[UPDATE]: When adding new byte producers
*/

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;

use crate::http::error::{LogviewError, Result};

const DEFAULT_READ_CHUNK: usize = 16 * 1024;

/// Sequential chunk reads terminated by `Ok(None)`.
///
/// A source is released by dropping it. Owners must not call `next_chunk`
/// again after it returned `Ok(None)` or an error.
#[async_trait]
pub trait ByteSource: Send {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>>;
}

#[async_trait]
impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        (**self).next_chunk().await
    }
}

/// Byte source over any async reader (files, stdin).
#[derive(Debug)]
pub struct ReaderSource<R> {
    reader: R,
    chunk_size: usize,
}

impl<R> ReaderSource<R>
where
    R: AsyncRead + Unpin + Send,
{
    pub fn new(reader: R) -> Self {
        Self::with_chunk_size(reader, DEFAULT_READ_CHUNK)
    }

    pub fn with_chunk_size(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            chunk_size: chunk_size.max(1),
        }
    }
}

#[async_trait]
impl<R> ByteSource for ReaderSource<R>
where
    R: AsyncRead + Unpin + Send,
{
    async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        let mut buf = BytesMut::with_capacity(self.chunk_size);
        let read = self.reader.read_buf(&mut buf).await?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(buf.freeze()))
    }
}

/// In-memory source fed through a channel.
///
/// Chunks arrive in send order; end-of-stream is signalled when every
/// [`ChunkSender`] has been dropped.
#[derive(Debug)]
pub struct ChunkSource {
    rx: mpsc::UnboundedReceiver<Result<Bytes>>,
}

/// Producer half of [`ChunkSource::channel`].
#[derive(Debug, Clone)]
pub struct ChunkSender {
    tx: mpsc::UnboundedSender<Result<Bytes>>,
}

impl ChunkSource {
    /// Create a source that can be fed while it is being read.
    pub fn channel() -> (ChunkSender, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ChunkSender { tx }, Self { rx })
    }

    /// Create a finished source from a fixed list of chunks.
    pub fn from_chunks<I, B>(chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        let (sender, source) = Self::channel();
        for chunk in chunks {
            sender.send(chunk);
        }
        source
    }

    /// Split `data` into chunks of at most `chunk_size` bytes.
    pub fn split_every(data: impl AsRef<[u8]>, chunk_size: usize) -> Self {
        let data = data.as_ref();
        let size = chunk_size.max(1);
        Self::from_chunks(
            data.chunks(size)
                .map(Bytes::copy_from_slice)
                .collect::<Vec<_>>(),
        )
    }
}

impl ChunkSender {
    /// Queue a chunk. Returns `false` once the source has been dropped.
    pub fn send(&self, chunk: impl Into<Bytes>) -> bool {
        self.tx.send(Ok(chunk.into())).is_ok()
    }

    /// Queue a read-level transport failure.
    pub fn fail(&self, err: std::io::Error) -> bool {
        self.tx.send(Err(LogviewError::Io(err))).is_ok()
    }

    /// True once the reading side has been released.
    pub fn is_released(&self) -> bool {
        self.tx.is_closed()
    }
}

#[async_trait]
impl ByteSource for ChunkSource {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        match self.rx.recv().await {
            Some(Ok(chunk)) => Ok(Some(chunk)),
            Some(Err(err)) => Err(err),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn chunk_source_yields_in_order_then_ends() {
        let mut source = ChunkSource::from_chunks(vec!["ab", "cd"]);
        assert_eq!(source.next_chunk().await.unwrap(), Some(Bytes::from("ab")));
        assert_eq!(source.next_chunk().await.unwrap(), Some(Bytes::from("cd")));
        assert_eq!(source.next_chunk().await.unwrap(), None);
    }

    #[tokio::test]
    async fn chunk_sender_reports_release() {
        let (sender, source) = ChunkSource::channel();
        assert!(!sender.is_released());
        drop(source);
        assert!(sender.is_released());
        assert!(!sender.send("late"));
    }

    #[tokio::test]
    async fn reader_source_reads_until_eof() {
        let data: &[u8] = b"{\"a\":1}\n{\"a\":2}\n";
        let mut source = ReaderSource::with_chunk_size(data, 4);
        let mut collected = Vec::new();
        while let Some(chunk) = source.next_chunk().await.unwrap() {
            collected.extend_from_slice(&chunk);
        }
        assert_eq!(collected, data);
    }
}
