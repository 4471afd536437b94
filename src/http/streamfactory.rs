use crate::base::neterror::NetError;
use crate::http::responsebody::BodyStream;
use crate::http::transport::{Transport, TransportRequest, TransportResponse};
use crate::socket::connectjob::ConnectJob;
use futures::future::BoxFuture;
use http::header::HOST;
use http::{HeaderValue, Request};
use http_body_util::Full;
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use tokio::task::JoinHandle;

/// Aborts the connection driver when dropped, closing the socket.
struct ConnectionGuard(JoinHandle<()>);

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// The default [`Transport`]: one fresh HTTP/1.1 connection per call.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpStreamFactory;

impl HttpStreamFactory {
    pub fn new() -> Self {
        Self
    }

    async fn send(&self, mut request: TransportRequest) -> Result<TransportResponse, NetError> {
        // 1. Get raw socket
        let socket = ConnectJob::connect(&request).await?;
        tracing::trace!(
            host = %request.host,
            port = request.port,
            encrypted = socket.is_encrypted(),
            "connected"
        );
        let io = TokioIo::new(socket);

        // 2. Handshake
        let (mut sender, conn) = http1::handshake::<_, Full<bytes::Bytes>>(io)
            .await
            .map_err(|e| NetError::Transport(e.to_string()))?;

        // 3. Spawn the connection driver
        let host = request.host.clone();
        let guard = ConnectionGuard(tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::debug!(host = %host, error = %e, "connection closed with error");
            }
        }));

        // 4. Build and send
        let mut headers = std::mem::take(&mut request.headers);
        if !headers.contains_key(HOST) {
            let authority = HeaderValue::from_str(&request.authority()).map_err(|_| {
                NetError::InvalidHeader {
                    name: HOST.to_string(),
                }
            })?;
            headers.insert(HOST, authority);
        }

        let mut req = Request::builder()
            .method(request.method)
            .uri(request.path.as_str())
            .body(Full::new(request.body))
            .map_err(|e| NetError::InvalidUrl(e.to_string()))?;
        *req.headers_mut() = headers;

        let resp = sender
            .send_request(req)
            .await
            .map_err(|e| NetError::Transport(e.to_string()))?;

        let (parts, body) = resp.into_parts();
        Ok(TransportResponse {
            status: parts.status,
            headers: parts.headers,
            body: BodyStream::from_body(body, guard),
        })
    }
}

impl Transport for HttpStreamFactory {
    fn open(&self, request: TransportRequest) -> BoxFuture<'_, Result<TransportResponse, NetError>> {
        Box::pin(self.send(request))
    }
}
