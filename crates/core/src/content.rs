//! Single-consumption blob content.

use bytes::{Bytes, BytesMut};
use futures::stream::{self, Stream, StreamExt};
use std::fmt;
use std::io;
use std::pin::Pin;

/// A boxed stream of byte chunks.
pub type ChunkStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send + 'static>>;

/// Lazily produced blob content with an optional known total length.
///
/// Content is consumed at most once: the type is not `Clone`, and every
/// consumer takes `self` by value, so double consumption is a move error.
pub struct Content {
    stream: ChunkStream,
    size: Option<u64>,
}

impl Content {
    /// Wrap a chunk stream, with the total length when it is known up front.
    pub fn new<S>(stream: S, size: Option<u64>) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        Self {
            stream: Box::pin(stream),
            size,
        }
    }

    /// Content holding a single in-memory chunk.
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        let size = data.len() as u64;
        Self::new(stream::once(async move { Ok(data) }), Some(size))
    }

    /// Empty content.
    pub fn empty() -> Self {
        Self::new(stream::empty(), Some(0))
    }

    /// The total length in bytes, if known.
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    /// Consume the content as a chunk stream.
    pub fn into_stream(self) -> ChunkStream {
        self.stream
    }

    /// Consume the content, collecting all chunks into one buffer.
    pub async fn into_bytes(self) -> io::Result<Bytes> {
        let mut buf = match self.size {
            Some(size) => BytesMut::with_capacity(usize::try_from(size).unwrap_or(0)),
            None => BytesMut::new(),
        };
        let mut stream = self.stream;
        while let Some(chunk) = stream.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Content").field("size", &self.size).finish()
    }
}

impl From<Bytes> for Content {
    fn from(data: Bytes) -> Self {
        Self::from_bytes(data)
    }
}

impl From<Vec<u8>> for Content {
    fn from(data: Vec<u8>) -> Self {
        Self::from_bytes(data)
    }
}
