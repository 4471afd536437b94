//! Shared fixtures for integration tests.
//!
//! - `MockTransport`: scripted replies, records every call it receives
//! - `serve_once` / `serve_forever`: raw HTTP/1.1 responses from a local socket
//! - `gzip` / `zlib`: compressed fixtures

#![allow(dead_code)]

use bytes::Bytes;
use chainfetch::http::{BodyStream, Transport, TransportRequest, TransportResponse};
use chainfetch::{NetError, RequestContext};
use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;
use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use std::collections::VecDeque;
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

/// One scripted transport reply.
pub enum Reply {
    Respond {
        status: u16,
        headers: Vec<(&'static str, String)>,
        chunks: Vec<Bytes>,
        /// Set once any body chunk is pulled.
        polled: Option<Arc<AtomicBool>>,
    },
    /// Never answers. The flag is set when the call is dropped.
    Hang(Arc<AtomicBool>),
    Fail(NetError),
}

impl Reply {
    pub fn ok(body: &str) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: &str) -> Self {
        Reply::Respond {
            status,
            headers: Vec::new(),
            chunks: vec![Bytes::copy_from_slice(body.as_bytes())],
            polled: None,
        }
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        if let Reply::Respond { headers, .. } = &mut self {
            headers.push((name, value.into()));
        }
        self
    }

    pub fn chunks<I: IntoIterator<Item = Bytes>>(mut self, body: I) -> Self {
        if let Reply::Respond { chunks, .. } = &mut self {
            *chunks = body.into_iter().collect();
        }
        self
    }

    pub fn track(mut self, flag: &Arc<AtomicBool>) -> Self {
        if let Reply::Respond { polled, .. } = &mut self {
            *polled = Some(Arc::clone(flag));
        }
        self
    }
}

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// A [`Transport`] that replays scripted replies in order. Once the script
/// runs out every call gets an empty `200`.
#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<TransportRequest>>,
}

impl MockTransport {
    pub fn new<I: IntoIterator<Item = Reply>>(replies: I) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<TransportRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// A context dispatching through this transport.
    pub fn context(self: &Arc<Self>) -> Arc<RequestContext> {
        Arc::new(
            RequestContext::builder()
                .shared_transport(self.clone())
                .build(),
        )
    }
}

impl Transport for MockTransport {
    fn open(&self, request: TransportRequest) -> BoxFuture<'_, Result<TransportResponse, NetError>> {
        self.calls.lock().unwrap().push(request);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Reply::ok(""));

        Box::pin(async move {
            match reply {
                Reply::Respond {
                    status,
                    headers,
                    chunks,
                    polled,
                } => {
                    let mut map = HeaderMap::new();
                    for (name, value) in headers {
                        map.append(
                            HeaderName::from_static(name),
                            HeaderValue::from_str(&value).unwrap(),
                        );
                    }
                    let body = stream::iter(chunks.into_iter().map(Ok)).inspect(move |_| {
                        if let Some(flag) = &polled {
                            flag.store(true, Ordering::SeqCst);
                        }
                    });
                    Ok(TransportResponse {
                        status: StatusCode::from_u16(status).unwrap(),
                        headers: map,
                        body: BodyStream::new(body),
                    })
                }
                Reply::Hang(flag) => {
                    let _guard = DropFlag(flag);
                    std::future::pending::<Result<TransportResponse, NetError>>().await
                }
                Reply::Fail(err) => Err(err),
            }
        })
    }
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Read one request: head, then `Content-Length` bytes of body.
pub async fn read_request(socket: &mut TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        if let Some(end) = find_head_end(&data) {
            let head = String::from_utf8_lossy(&data[..end]).to_ascii_lowercase();
            let length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if data.len() >= end + 4 + length {
                break;
            }
        }
        let n = socket.read(&mut buf).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
    }
    String::from_utf8_lossy(&data).into_owned()
}

fn find_head_end(data: &[u8]) -> Option<usize> {
    data.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Answer a single connection with `response`. Resolves to the raw request.
pub async fn serve_once(response: &'static str) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            let request = read_request(&mut socket).await;
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
            let _ = tx.send(request);
        }
    });

    (base_url, rx)
}

/// Answer every connection via `respond(request, base_url)`. The counter
/// tracks accepted connections.
pub async fn serve_forever<F>(respond: F) -> (String, Arc<AtomicUsize>)
where
    F: Fn(&str, &str) -> String + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let hits = Arc::new(AtomicUsize::new(0));
    let respond = Arc::new(respond);

    let server_url = base_url.clone();
    let counter = Arc::clone(&hits);
    tokio::spawn(async move {
        loop {
            if let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                let respond = Arc::clone(&respond);
                let server_url = server_url.clone();
                tokio::spawn(async move {
                    let request = read_request(&mut socket).await;
                    let response = respond(&request, &server_url);
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        }
    });

    (base_url, hits)
}
