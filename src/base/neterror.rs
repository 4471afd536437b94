use std::time::Duration;
use thiserror::Error;

/// Coarse error taxonomy callers can branch on without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request could not be assembled from its inputs.
    Configuration,
    /// The URL scheme is neither `http` nor `https`.
    UnsupportedProtocol,
    /// Connection, DNS, TLS or protocol failure.
    Transport,
    /// The timer expired before the call settled.
    Timeout,
    /// The buffered body could not be decoded as requested.
    Parse,
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum NetError {
    // Configuration Errors
    #[error("Missing url parameter")]
    MissingUrl,
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid method: {0}")]
    InvalidMethod(String),
    #[error("Invalid header: {name}")]
    InvalidHeader { name: String },
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
    #[error("Invalid transport option '{name}': {reason}")]
    InvalidTransportOption { name: String, reason: String },
    #[error("Invalid redirect location: {0}")]
    InvalidRedirect(String),

    #[error("Bad URL protocol: {0}")]
    UnsupportedProtocol(String),

    // Transport Errors
    #[error("Name not resolved: {host}")]
    NameNotResolved { host: String, reason: String },
    #[error("Connection to {host}:{port} failed: {reason}")]
    ConnectionFailed {
        host: String,
        port: u16,
        reason: String,
    },
    #[error("SSL protocol error: {0}")]
    SslProtocolError(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Content decoding failed: {0}")]
    ContentDecodingFailed(String),
    #[error("Too many redirects (limit {limit})")]
    TooManyRedirects { limit: usize },

    #[error("Timeout reached after {0:?}")]
    TimedOut(Duration),

    #[error("Failed to parse response body as {kind}: {reason}")]
    Parse { kind: &'static str, reason: String },
}

impl NetError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            NetError::MissingUrl
            | NetError::InvalidUrl(_)
            | NetError::InvalidMethod(_)
            | NetError::InvalidHeader { .. }
            | NetError::InvalidBody(_)
            | NetError::InvalidTransportOption { .. }
            | NetError::InvalidRedirect(_) => ErrorKind::Configuration,
            NetError::UnsupportedProtocol(_) => ErrorKind::UnsupportedProtocol,
            NetError::NameNotResolved { .. }
            | NetError::ConnectionFailed { .. }
            | NetError::SslProtocolError(_)
            | NetError::Transport(_)
            | NetError::ContentDecodingFailed(_)
            | NetError::TooManyRedirects { .. } => ErrorKind::Transport,
            NetError::TimedOut(_) => ErrorKind::Timeout,
            NetError::Parse { .. } => ErrorKind::Parse,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind() == ErrorKind::Timeout
    }

    /// Numeric code in the net_error_list.h ranges (-1xx connection, -3xx HTTP).
    pub fn as_i32(&self) -> i32 {
        match self {
            NetError::ConnectionFailed { .. } => -104,
            NetError::NameNotResolved { .. } => -105,
            NetError::SslProtocolError(_) => -107,
            NetError::TimedOut(_) => -118,
            NetError::Transport(_) => -320,

            NetError::InvalidUrl(_) => -300,
            NetError::UnsupportedProtocol(_) => -301,
            NetError::MissingUrl => -302,
            NetError::InvalidRedirect(_) => -303,
            NetError::TooManyRedirects { .. } => -310,
            NetError::InvalidMethod(_) => -322,
            NetError::ContentDecodingFailed(_) => -330,
            NetError::InvalidHeader { .. } => -341,
            NetError::Parse { .. } => -340,

            // Client-side configuration errors (custom codes starting at -1000)
            NetError::InvalidBody(_) => -1000,
            NetError::InvalidTransportOption { .. } => -1001,
        }
    }

    pub(crate) fn parse_json(err: serde_json::Error) -> Self {
        NetError::Parse {
            kind: "json",
            reason: err.to_string(),
        }
    }

    pub(crate) fn parse_text(err: std::string::FromUtf8Error) -> Self {
        NetError::Parse {
            kind: "text",
            reason: err.to_string(),
        }
    }
}
