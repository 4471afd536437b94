//! Request body for POST/PUT operations.
//!
//! Bodies are serialized when they are set, so the executor only ever sees
//! bytes plus the tag that decides which default headers to attach.

use crate::base::neterror::NetError;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How a body payload is serialized and announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SendDataAs {
    /// `application/json`.
    Json,
    /// `application/x-www-form-urlencoded`, with a computed `Content-Length`.
    Form,
    /// Raw bytes, no default content headers.
    Buffer,
}

impl SendDataAs {
    pub fn content_type(self) -> Option<&'static str> {
        match self {
            SendDataAs::Json => Some("application/json"),
            SendDataAs::Form => Some("application/x-www-form-urlencoded"),
            SendDataAs::Buffer => None,
        }
    }
}

impl FromStr for SendDataAs {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(SendDataAs::Json),
            "form" => Ok(SendDataAs::Form),
            "buffer" => Ok(SendDataAs::Buffer),
            other => Err(NetError::InvalidBody(format!(
                "unknown body encoding '{other}'"
            ))),
        }
    }
}

/// Body data as handed to the builder, before serialization.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Opaque bytes.
    Raw(Bytes),
    /// Already-encoded text, written verbatim.
    Text(String),
    /// Structured data serialized according to the body tag.
    Structured(serde_json::Value),
}

impl Payload {
    /// The tag used when the caller gives no hint: structured data is JSON,
    /// everything else is sent as a plain buffer.
    pub fn inferred_encoding(&self) -> SendDataAs {
        match self {
            Payload::Structured(_) => SendDataAs::Json,
            Payload::Raw(_) | Payload::Text(_) => SendDataAs::Buffer,
        }
    }
}

impl From<Bytes> for Payload {
    fn from(b: Bytes) -> Self {
        Payload::Raw(b)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(v: Vec<u8>) -> Self {
        Payload::Raw(Bytes::from(v))
    }
}

impl From<&[u8]> for Payload {
    fn from(s: &[u8]) -> Self {
        Payload::Raw(Bytes::copy_from_slice(s))
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::Text(s)
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::Text(s.to_owned())
    }
}

impl From<serde_json::Value> for Payload {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::String(s) => Payload::Text(s),
            other => Payload::Structured(other),
        }
    }
}

/// Serialized request body, tagged with its encoding.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    /// No body (GET, HEAD, DELETE).
    #[default]
    Empty,
    /// Raw bytes.
    Buffer(Bytes),
    /// JSON text.
    Json(Bytes),
    /// URL-encoded form.
    Form(Bytes),
}

impl From<String> for RequestBody {
    fn from(s: String) -> Self {
        RequestBody::Buffer(Bytes::from(s))
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(v: Vec<u8>) -> Self {
        RequestBody::Buffer(Bytes::from(v))
    }
}

impl From<&str> for RequestBody {
    fn from(s: &str) -> Self {
        RequestBody::Buffer(Bytes::from(s.to_owned()))
    }
}

impl From<Bytes> for RequestBody {
    fn from(b: Bytes) -> Self {
        RequestBody::Buffer(b)
    }
}

impl RequestBody {
    /// Serialize `payload`, using `hint` when given and inferring otherwise.
    pub fn encode(payload: Payload, hint: Option<SendDataAs>) -> Result<Self, NetError> {
        let encoding = hint.unwrap_or_else(|| payload.inferred_encoding());

        let bytes = match (encoding, payload) {
            (SendDataAs::Form, Payload::Structured(value)) => serde_urlencoded::to_string(&value)
                .map(Bytes::from)
                .map_err(|e| NetError::InvalidBody(e.to_string()))?,
            (_, Payload::Structured(value)) => serde_json::to_vec(&value)
                .map(Bytes::from)
                .map_err(|e| NetError::InvalidBody(e.to_string()))?,
            (_, Payload::Text(s)) => Bytes::from(s),
            (_, Payload::Raw(b)) => b,
        };

        Ok(Self::tagged(encoding, bytes))
    }

    /// Serialize any `Serialize` value as JSON.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, NetError> {
        serde_json::to_vec(value)
            .map(|v| RequestBody::Json(Bytes::from(v)))
            .map_err(|e| NetError::InvalidBody(e.to_string()))
    }

    /// Serialize any `Serialize` value as an URL-encoded form.
    pub fn form<T: Serialize + ?Sized>(value: &T) -> Result<Self, NetError> {
        serde_urlencoded::to_string(value)
            .map(|v| RequestBody::Form(Bytes::from(v)))
            .map_err(|e| NetError::InvalidBody(e.to_string()))
    }

    fn tagged(encoding: SendDataAs, bytes: Bytes) -> Self {
        match encoding {
            SendDataAs::Json => RequestBody::Json(bytes),
            SendDataAs::Form => RequestBody::Form(bytes),
            SendDataAs::Buffer => RequestBody::Buffer(bytes),
        }
    }

    /// Check if the body is empty. A zero-length payload counts as empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the length of the body in bytes.
    pub fn len(&self) -> usize {
        match self {
            RequestBody::Empty => 0,
            RequestBody::Buffer(b) | RequestBody::Json(b) | RequestBody::Form(b) => b.len(),
        }
    }

    pub fn encoding(&self) -> Option<SendDataAs> {
        match self {
            RequestBody::Empty => None,
            RequestBody::Buffer(_) => Some(SendDataAs::Buffer),
            RequestBody::Json(_) => Some(SendDataAs::Json),
            RequestBody::Form(_) => Some(SendDataAs::Form),
        }
    }

    /// The bytes to write. Cheap: `Bytes` is reference counted.
    pub fn bytes(&self) -> Bytes {
        match self {
            RequestBody::Empty => Bytes::new(),
            RequestBody::Buffer(b) | RequestBody::Json(b) | RequestBody::Form(b) => b.clone(),
        }
    }
}
