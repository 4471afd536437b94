use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use crate::http::transport::{Scheme, TransportRequest};
use crate::socket::client::SocketType;
use boring::ssl::{SslConnector, SslMethod};
use std::io;
use tokio::net::TcpStream;

/// Manages the connection process: DNS -> TCP -> SSL.
/// Roughly equivalent to net::ConnectJob.
pub struct ConnectJob;

impl ConnectJob {
    pub async fn connect(request: &TransportRequest) -> Result<SocketType, NetError> {
        let host = request.host.as_str();
        let port = request.port;

        // 1. DNS Resolution
        let addrs: Vec<_> = tokio::net::lookup_host((host, port))
            .await
            .dns_context(host)?
            .collect();
        if addrs.is_empty() {
            return Err(NetError::NameNotResolved {
                host: host.to_string(),
                reason: "no addresses".to_string(),
            });
        }

        // 2. TCP Connect, first address that answers wins
        let mut last_err = None;
        let mut stream = None;
        for addr in addrs {
            match TcpStream::connect(addr).await {
                Ok(s) => {
                    stream = Some(s);
                    break;
                }
                Err(e) => last_err = Some(e),
            }
        }
        let stream = match stream {
            Some(s) => s,
            None => {
                let err = last_err.unwrap_or_else(|| io::Error::from(io::ErrorKind::NotConnected));
                return Err::<SocketType, _>(err).connection_context(host, port);
            }
        };
        let _ = stream.set_nodelay(true);

        // 3. SSL Handshake (if https)
        match request.scheme {
            Scheme::Http => Ok(SocketType::Tcp(stream)),
            Scheme::Https => {
                let mut builder = SslConnector::builder(SslMethod::tls())
                    .map_err(|e| NetError::SslProtocolError(e.to_string()))?;

                // Only HTTP/1.1 is spoken over the connection.
                builder
                    .set_alpn_protos(b"\x08http/1.1")
                    .map_err(|e| NetError::SslProtocolError(e.to_string()))?;

                let connector = builder.build();
                let config = connector
                    .configure()
                    .map_err(|e| NetError::SslProtocolError(e.to_string()))?;

                let server_name = request
                    .extra
                    .get("servername")
                    .and_then(|v| v.as_str())
                    .unwrap_or(host);

                let tls_stream = tokio_boring::connect(config, server_name, stream)
                    .await
                    .map_err(|e| {
                        tracing::debug!(host = %host, error = ?e, "SSL handshake failed");
                        NetError::SslProtocolError(format!("handshake with {host} failed"))
                    })?;

                Ok(SocketType::Ssl(tls_stream))
            }
        }
    }
}
