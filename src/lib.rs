//! # chainfetch
//!
//! A chainable HTTP request client.
//!
//! Build a request with a fluent builder, send it over plain or encrypted
//! HTTP/1.1, and get back either a buffered [`Response`](http::Response)
//! (optionally decompressed and parsed) or a live byte stream.
//!
//! ## Features
//!
//! - **Fluent configuration**: query, headers, path segments, bodies, timeouts
//! - **Bodies**: raw bytes, JSON, or URL-encoded forms with default headers
//! - **Responses**: buffered with optional JSON/text parsing, or streamed
//! - **Compression**: gzip/deflate negotiation and streaming decoding
//! - **Redirects**: optional `Location` following, unbounded unless capped
//! - **Transport overrides**: per-request escape hatch into the transport call
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chainfetch::http::ParseAs;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), chainfetch::NetError> {
//!     let outcome = chainfetch::get("https://example.com/api")?
//!         .query("page", 1)
//!         .parse(ParseAs::Json)
//!         .follow_redirects(true)
//!         .send()
//!         .await?;
//!     println!("Status: {}", outcome.status());
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error and state types
//! - [`http`] - Bodies, responses, decoding and the transport seam
//! - [`socket`] - TCP/TLS connection setup
//! - [`urlrequest`] - Request builder, options, context and executor

pub mod base;
pub mod http;
pub mod socket;
pub mod urlrequest;

pub use crate::base::neterror::{ErrorKind, NetError};
pub use crate::urlrequest::{RequestBuilder, RequestContext, RequestIntent, RequestOptions};

use ::http::Method;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `User-Agent` sent with body-carrying requests that do not set one.
pub const USER_AGENT: &str = concat!("chainfetch/", env!("CARGO_PKG_VERSION"));

/// Start a request. The method defaults to `GET` unless the intent names one.
///
/// Fails with [`NetError::MissingUrl`] or [`NetError::InvalidUrl`] before any
/// I/O when no usable URL is given.
pub fn request<I: Into<RequestIntent>>(intent: I) -> Result<RequestBuilder, NetError> {
    RequestBuilder::new(intent)
}

fn verb<I: Into<RequestIntent>>(method: Method, intent: I) -> Result<RequestBuilder, NetError> {
    RequestBuilder::with_context(RequestContext::shared(), intent.into(), Some(method))
}

/// Start a `GET` request.
pub fn get<I: Into<RequestIntent>>(intent: I) -> Result<RequestBuilder, NetError> {
    verb(Method::GET, intent)
}

/// Start a `HEAD` request.
pub fn head<I: Into<RequestIntent>>(intent: I) -> Result<RequestBuilder, NetError> {
    verb(Method::HEAD, intent)
}

/// Start a `POST` request.
pub fn post<I: Into<RequestIntent>>(intent: I) -> Result<RequestBuilder, NetError> {
    verb(Method::POST, intent)
}

/// Start a `PUT` request.
pub fn put<I: Into<RequestIntent>>(intent: I) -> Result<RequestBuilder, NetError> {
    verb(Method::PUT, intent)
}

/// Start a `DELETE` request.
pub fn delete<I: Into<RequestIntent>>(intent: I) -> Result<RequestBuilder, NetError> {
    verb(Method::DELETE, intent)
}

/// Start a `CONNECT` request.
pub fn connect<I: Into<RequestIntent>>(intent: I) -> Result<RequestBuilder, NetError> {
    verb(Method::CONNECT, intent)
}

/// Start an `OPTIONS` request.
pub fn options<I: Into<RequestIntent>>(intent: I) -> Result<RequestBuilder, NetError> {
    verb(Method::OPTIONS, intent)
}

/// Start a `TRACE` request.
pub fn trace<I: Into<RequestIntent>>(intent: I) -> Result<RequestBuilder, NetError> {
    verb(Method::TRACE, intent)
}

/// Start a `PATCH` request.
pub fn patch<I: Into<RequestIntent>>(intent: I) -> Result<RequestBuilder, NetError> {
    verb(Method::PATCH, intent)
}
