//! Streaming content decoding for `Content-Encoding: gzip` and `deflate`.
//!
//! Decompression runs as a transform over the body stream: every input
//! chunk is fed to the inflater as it arrives and whatever output it
//! produces is yielded before the next chunk is read.

use crate::base::neterror::NetError;
use crate::http::responsebody::BodyStream;
use bytes::Bytes;
use flate2::write::{GzDecoder, ZlibDecoder};
use futures::{ready, Stream, StreamExt};
use http::header::CONTENT_ENCODING;
use http::HeaderMap;
use std::io::{self, Write};
use std::pin::Pin;
use std::task::{Context, Poll};

/// Value advertised in `Accept-Encoding` when compression is enabled.
pub const ACCEPT_ENCODING_VALUE: &str = "gzip, deflate";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncoding {
    Gzip,
    /// zlib-wrapped deflate, as servers send for `Content-Encoding: deflate`.
    Deflate,
}

impl ContentEncoding {
    /// The decodable encoding declared by `headers`, if any.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let value = headers.get(CONTENT_ENCODING)?.to_str().ok()?.trim();
        if value.eq_ignore_ascii_case("gzip") {
            Some(ContentEncoding::Gzip)
        } else if value.eq_ignore_ascii_case("deflate") {
            Some(ContentEncoding::Deflate)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContentEncoding::Gzip => "gzip",
            ContentEncoding::Deflate => "deflate",
        }
    }
}

/// Wrap `body` in a decompressing stream.
pub fn decode(body: BodyStream, encoding: ContentEncoding) -> BodyStream {
    let inflater = match encoding {
        ContentEncoding::Gzip => Inflater::Gzip(GzDecoder::new(Vec::new())),
        ContentEncoding::Deflate => Inflater::Deflate(ZlibDecoder::new(Vec::new())),
    };
    BodyStream::new(Decoded {
        inner: body,
        inflater,
        fed: false,
        done: false,
    })
}

enum Inflater {
    Gzip(GzDecoder<Vec<u8>>),
    Deflate(ZlibDecoder<Vec<u8>>),
}

impl Inflater {
    fn feed(&mut self, chunk: &[u8]) -> io::Result<Vec<u8>> {
        match self {
            Inflater::Gzip(d) => {
                d.write_all(chunk)?;
                Ok(std::mem::take(d.get_mut()))
            }
            Inflater::Deflate(d) => {
                d.write_all(chunk)?;
                Ok(std::mem::take(d.get_mut()))
            }
        }
    }

    fn finish(&mut self) -> io::Result<Vec<u8>> {
        match self {
            Inflater::Gzip(d) => {
                d.try_finish()?;
                Ok(std::mem::take(d.get_mut()))
            }
            Inflater::Deflate(d) => {
                d.try_finish()?;
                Ok(std::mem::take(d.get_mut()))
            }
        }
    }
}

struct Decoded {
    inner: BodyStream,
    inflater: Inflater,
    /// Whether any non-empty input reached the inflater.
    fed: bool,
    done: bool,
}

impl Decoded {
    fn fail(&mut self, err: io::Error) -> Poll<Option<Result<Bytes, NetError>>> {
        self.done = true;
        Poll::Ready(Some(Err(NetError::ContentDecodingFailed(err.to_string()))))
    }
}

impl Stream for Decoded {
    type Item = Result<Bytes, NetError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        loop {
            if this.done {
                return Poll::Ready(None);
            }

            match ready!(this.inner.poll_next_unpin(cx)) {
                Some(Ok(chunk)) if chunk.is_empty() => continue,
                Some(Ok(chunk)) => {
                    this.fed = true;
                    match this.inflater.feed(&chunk) {
                        // Header bytes or a partial block; keep reading.
                        Ok(out) if out.is_empty() => continue,
                        Ok(out) => return Poll::Ready(Some(Ok(Bytes::from(out)))),
                        Err(e) => return this.fail(e),
                    }
                }
                Some(Err(e)) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(e)));
                }
                // An empty body (HEAD, 204, 304) has nothing to finish.
                None if !this.fed => {
                    this.done = true;
                    return Poll::Ready(None);
                }
                None => {
                    this.done = true;
                    return match this.inflater.finish() {
                        Ok(out) if out.is_empty() => Poll::Ready(None),
                        Ok(out) => Poll::Ready(Some(Ok(Bytes::from(out)))),
                        Err(e) => this.fail(e),
                    };
                }
            }
        }
    }
}
