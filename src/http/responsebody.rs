//! Response body streaming.
//!
//! [`BodyStream`] is the one byte-stream type that flows between the
//! transport, the decoders and the caller. Chunks are yielded in the order
//! the transport produced them.

use crate::base::neterror::NetError;
use bytes::{Bytes, BytesMut};
use futures::stream::{self, BoxStream, Stream, StreamExt};
use http_body::Body;
use http_body_util::BodyExt;
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

/// An ordered stream of body chunks.
pub struct BodyStream {
    inner: BoxStream<'static, Result<Bytes, NetError>>,
}

impl BodyStream {
    /// Wrap any stream of chunks.
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, NetError>> + Send + 'static,
    {
        Self {
            inner: stream.boxed(),
        }
    }

    /// A stream that ends immediately.
    pub fn empty() -> Self {
        Self::new(stream::empty())
    }

    /// A stream yielding the given chunks, in order.
    pub fn from_chunks<I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = Bytes>,
        I::IntoIter: Send + 'static,
    {
        Self::new(stream::iter(chunks.into_iter().map(Ok)))
    }

    /// Adapt an HTTP body, such as hyper's `Incoming`. `guard` lives as long
    /// as the stream does.
    pub fn from_body<B, G>(body: B, guard: G) -> Self
    where
        B: Body<Data = Bytes> + Send + 'static,
        B::Error: fmt::Display,
        G: Send + 'static,
    {
        let data = body
            .into_data_stream()
            .map(|chunk| chunk.map_err(|e| NetError::Transport(e.to_string())));

        Self::new(Guarded {
            inner: data.boxed(),
            _guard: guard,
        })
    }

    /// Read the whole stream into memory, appending chunks in arrival order.
    /// The first stream error is returned and nothing else is kept.
    pub async fn collect_bytes(mut self) -> Result<Bytes, NetError> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = self.inner.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }
}

impl Stream for BodyStream {
    type Item = Result<Bytes, NetError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl fmt::Debug for BodyStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyStream").finish_non_exhaustive()
    }
}

/// Keeps a value (typically the connection task handle) alive with the body.
struct Guarded<G> {
    inner: BoxStream<'static, Result<Bytes, NetError>>,
    _guard: G,
}

impl<G> Unpin for Guarded<G> {}

impl<G> Stream for Guarded<G> {
    type Item = Result<Bytes, NetError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_collect_preserves_order() {
        let body = BodyStream::from_chunks(vec![
            Bytes::from_static(b"he"),
            Bytes::from_static(b"ll"),
            Bytes::from_static(b"o"),
        ]);
        assert_eq!(body.collect_bytes().await.unwrap(), Bytes::from_static(b"hello"));
    }

    #[tokio::test]
    async fn test_body_adapter_drops_guard_with_stream() {
        use http_body_util::Full;
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        struct Flag(Arc<AtomicBool>);
        impl Drop for Flag {
            fn drop(&mut self) {
                self.0.store(true, Ordering::SeqCst);
            }
        }

        let dropped = Arc::new(AtomicBool::new(false));
        let body = BodyStream::from_body(
            Full::new(Bytes::from_static(b"payload")),
            Flag(Arc::clone(&dropped)),
        );
        assert!(!dropped.load(Ordering::SeqCst));
        assert_eq!(body.collect_bytes().await.unwrap(), Bytes::from_static(b"payload"));
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_collect_empty() {
        assert!(BodyStream::empty().collect_bytes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_collect_stops_at_first_error() {
        let body = BodyStream::new(stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(NetError::Transport("reset".into())),
            Ok(Bytes::from_static(b"never")),
        ]));
        let err = body.collect_bytes().await.unwrap_err();
        assert_eq!(err, NetError::Transport("reset".into()));
    }
}
