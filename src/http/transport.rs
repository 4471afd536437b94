//! The seam between a request job and the network.
//!
//! A job turns its configuration into a [`TransportRequest`] and hands it to
//! a [`Transport`]. Dropping the returned future aborts the call.

use crate::base::neterror::NetError;
use crate::http::responsebody::BodyStream;
use bytes::Bytes;
use futures::future::BoxFuture;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method, StatusCode};
use serde_json::Value;
use url::{Host, Url};

/// Transport option name → value. Merged verbatim over the computed
/// request parameters.
pub type TransportOptions = serde_json::Map<String, Value>;

/// Plain or encrypted HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    /// Pick the transport scheme for `url`, rejecting anything but http(s).
    pub fn from_url(url: &Url) -> Result<Self, NetError> {
        Self::parse(url.scheme())
    }

    /// Accepts `http`, `https` and the `http:`/`https:` protocol spelling.
    pub fn parse(s: &str) -> Result<Self, NetError> {
        match s.trim_end_matches(':').to_ascii_lowercase().as_str() {
            "http" => Ok(Scheme::Http),
            "https" => Ok(Scheme::Https),
            _ => Err(NetError::UnsupportedProtocol(s.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    pub fn default_port(self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }
}

/// Everything a transport needs to issue one call.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
    /// Path plus query, in origin form.
    pub path: String,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// Overrides the job does not interpret, for the transport to use.
    pub extra: TransportOptions,
}

impl TransportRequest {
    /// Compute the transport parameters for `url`.
    pub fn from_url(
        scheme: Scheme,
        url: &Url,
        method: Method,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<Self, NetError> {
        let host = match url.host() {
            Some(Host::Domain(d)) => d.to_string(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            None => return Err(NetError::InvalidUrl(format!("{url} has no host"))),
        };
        let port = url.port().unwrap_or_else(|| scheme.default_port());

        let mut path = url.path().to_string();
        if let Some(query) = url.query() {
            path.push('?');
            path.push_str(query);
        }

        Ok(Self {
            scheme,
            host,
            port,
            path,
            method,
            headers,
            body,
            extra: TransportOptions::new(),
        })
    }

    /// Merge `overrides` over the computed parameters. Known keys replace the
    /// matching field, everything else lands in [`extra`](Self::extra).
    pub fn apply_overrides(&mut self, overrides: &TransportOptions) -> Result<(), NetError> {
        for (name, value) in overrides {
            match name.as_str() {
                "host" | "hostname" => self.host = option_str(name, value)?.to_string(),
                "port" => self.port = option_port(name, value)?,
                "path" => self.path = option_str(name, value)?.to_string(),
                "method" => {
                    let method = option_str(name, value)?.to_ascii_uppercase();
                    self.method = Method::from_bytes(method.as_bytes())
                        .map_err(|_| NetError::InvalidMethod(method))?;
                }
                "protocol" | "scheme" => self.scheme = Scheme::parse(option_str(name, value)?)?,
                "headers" => self.headers = option_headers(name, value)?,
                _ => {
                    self.extra.insert(name.clone(), value.clone());
                }
            }
        }
        Ok(())
    }

    /// `Host` header value: the port is omitted when it is the scheme default.
    pub fn authority(&self) -> String {
        let host = if self.host.contains(':') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        if self.port == self.scheme.default_port() {
            host
        } else {
            format!("{}:{}", host, self.port)
        }
    }
}

/// Response head plus the unread body.
#[derive(Debug)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: BodyStream,
}

/// Issues a single HTTP call.
pub trait Transport: Send + Sync {
    /// Open the call and resolve once response headers arrive. Dropping the
    /// future, or the body of the returned response, aborts the call.
    fn open(&self, request: TransportRequest) -> BoxFuture<'_, Result<TransportResponse, NetError>>;
}

fn invalid_option(name: &str, reason: &str) -> NetError {
    NetError::InvalidTransportOption {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

fn option_str<'a>(name: &str, value: &'a Value) -> Result<&'a str, NetError> {
    value
        .as_str()
        .ok_or_else(|| invalid_option(name, "expected a string"))
}

fn option_port(name: &str, value: &Value) -> Result<u16, NetError> {
    let port = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse::<u64>().ok(),
        _ => None,
    };
    port.and_then(|p| u16::try_from(p).ok())
        .ok_or_else(|| invalid_option(name, "expected a port number"))
}

fn option_headers(name: &str, value: &Value) -> Result<HeaderMap, NetError> {
    let object = value
        .as_object()
        .ok_or_else(|| invalid_option(name, "expected an object"))?;

    let mut headers = HeaderMap::with_capacity(object.len());
    for (key, value) in object {
        let (k, v) = header_pair(key, value)?;
        headers.insert(k, v);
    }
    Ok(headers)
}

/// Convert a loosely typed header pair. Names are stored lower-cased,
/// non-string values use their JSON text.
pub(crate) fn header_pair(name: &str, value: &Value) -> Result<(HeaderName, HeaderValue), NetError> {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    header_from_parts(name, &text)
}

pub(crate) fn header_from_parts(
    name: &str,
    value: &str,
) -> Result<(HeaderName, HeaderValue), NetError> {
    let invalid = || NetError::InvalidHeader {
        name: name.to_string(),
    };
    let name = HeaderName::from_bytes(name.to_ascii_lowercase().as_bytes()).map_err(|_| invalid())?;
    let value = HeaderValue::from_str(value).map_err(|_| invalid())?;
    Ok((name, value))
}
