//! Response types delivered by a request job.

use crate::base::neterror::NetError;
use crate::http::responsebody::BodyStream;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::pin::Pin;
use std::str::FromStr;
use std::task::{Context, Poll};
use url::Url;

/// How a buffered body is decoded before delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseAs {
    Json,
    Text,
}

impl FromStr for ParseAs {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ParseAs::Json),
            "text" => Ok(ParseAs::Text),
            other => Err(NetError::Parse {
                kind: "parse mode",
                reason: format!("unknown parse mode '{other}'"),
            }),
        }
    }
}

/// A buffered body in its delivered representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Bytes(Bytes),
    Text(String),
    Json(serde_json::Value),
}

/// A fully buffered response.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    url: Url,
    body: Body,
}

impl Response {
    pub fn new(status: StatusCode, headers: HeaderMap, url: Url, body: Bytes) -> Self {
        Self {
            status,
            headers,
            url,
            body: Body::Bytes(body),
        }
    }

    /// Get the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get a reference to the headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The URL that produced this response, after any redirects.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn into_body(self) -> Body {
        self.body
    }

    /// Replace the raw body with its parsed form. On failure the body is
    /// left untouched.
    pub fn apply_parse(&mut self, parse: ParseAs) -> Result<(), NetError> {
        let Body::Bytes(raw) = &self.body else {
            return Ok(());
        };

        self.body = match parse {
            ParseAs::Json => Body::Json(serde_json::from_slice(raw).map_err(NetError::parse_json)?),
            ParseAs::Text => {
                Body::Text(String::from_utf8(raw.to_vec()).map_err(NetError::parse_text)?)
            }
        };
        Ok(())
    }

    /// The body as text, whatever its current representation.
    pub fn text(&self) -> Result<Cow<'_, str>, NetError> {
        match &self.body {
            Body::Bytes(b) => std::str::from_utf8(b)
                .map(Cow::Borrowed)
                .map_err(|e| NetError::Parse {
                    kind: "text",
                    reason: e.to_string(),
                }),
            Body::Text(s) => Ok(Cow::Borrowed(s)),
            Body::Json(v) => Ok(Cow::Owned(v.to_string())),
        }
    }

    /// Deserialize the body as JSON into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, NetError> {
        match &self.body {
            Body::Bytes(b) => serde_json::from_slice(b).map_err(NetError::parse_json),
            Body::Text(s) => serde_json::from_str(s).map_err(NetError::parse_json),
            Body::Json(v) => T::deserialize(v).map_err(NetError::parse_json),
        }
    }
}

/// A response whose body is handed over as a live stream.
#[derive(Debug)]
pub struct StreamedResponse {
    status: StatusCode,
    headers: HeaderMap,
    url: Url,
    body: BodyStream,
}

impl StreamedResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, url: Url, body: BodyStream) -> Self {
        Self {
            status,
            headers,
            url,
            body,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn into_body(self) -> BodyStream {
        self.body
    }
}

impl Stream for StreamedResponse {
    type Item = Result<Bytes, NetError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.body.poll_next_unpin(cx)
    }
}

/// What a sent request resolves to.
#[derive(Debug)]
pub enum Outcome {
    /// Buffered (and possibly parsed) response.
    Buffered(Response),
    /// Streamed mode: the body was not read.
    Streamed(StreamedResponse),
}

impl Outcome {
    pub fn is_streamed(&self) -> bool {
        matches!(self, Outcome::Streamed(_))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Outcome::Buffered(r) => r.status(),
            Outcome::Streamed(r) => r.status(),
        }
    }

    pub fn into_response(self) -> Option<Response> {
        match self {
            Outcome::Buffered(r) => Some(r),
            Outcome::Streamed(_) => None,
        }
    }

    pub fn into_stream(self) -> Option<StreamedResponse> {
        match self {
            Outcome::Streamed(s) => Some(s),
            Outcome::Buffered(_) => None,
        }
    }
}
