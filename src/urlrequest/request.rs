//! Chainable request builder.
//!
//! Every mutator takes the builder by value and returns it, so a request
//! reads as one expression. Nothing here touches the network until
//! [`RequestBuilder::send`].
//!
//! ```rust,ignore
//! let response = chainfetch::post("https://example.com")?
//!     .path("api/items")
//!     .query("page", 2)
//!     .header("X-Token", "secret")
//!     .body(serde_json::json!({"name": "widget"}))
//!     .parse(ParseAs::Json)
//!     .timeout(Duration::from_secs(5))
//!     .send()
//!     .await?;
//! ```

use crate::base::neterror::NetError;
use crate::http::requestbody::{Payload, RequestBody, SendDataAs};
use crate::http::response::{Outcome, ParseAs};
use crate::http::transport::header_from_parts;
use crate::urlrequest::config::RequestConfig;
use crate::urlrequest::context::RequestContext;
use crate::urlrequest::job::RequestJob;
use crate::urlrequest::options::RequestIntent;
use http::Method;
use serde::Serialize;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

/// Builder for a single request.
#[derive(Debug)]
pub struct RequestBuilder {
    context: Arc<RequestContext>,
    config: RequestConfig,
    /// First invalid input seen by a mutator, reported by `build`/`send`.
    error: Option<NetError>,
}

impl RequestBuilder {
    /// Start a request on the shared default context.
    pub fn new<I: Into<RequestIntent>>(intent: I) -> Result<Self, NetError> {
        Self::with_context(RequestContext::shared(), intent.into(), None)
    }

    /// `verb` pre-sets the method unless the intent names one.
    pub(crate) fn with_context(
        context: Arc<RequestContext>,
        intent: RequestIntent,
        verb: Option<Method>,
    ) -> Result<Self, NetError> {
        let (url, options) = intent.into_parts()?;
        let config = RequestConfig::from_options(&url, options, verb.unwrap_or(Method::GET))?;
        Ok(Self::from_config(context, config))
    }

    /// Wrap an already assembled configuration.
    pub fn from_config(context: Arc<RequestContext>, config: RequestConfig) -> Self {
        Self {
            context,
            config,
            error: None,
        }
    }

    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    fn record(&mut self, err: NetError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.config.method = method;
        self
    }

    /// Append one query parameter.
    pub fn query<V: Display>(mut self, name: &str, value: V) -> Self {
        self.config
            .url
            .query_pairs_mut()
            .append_pair(name, &value.to_string());
        self
    }

    /// Append several query parameters, in iteration order.
    pub fn query_pairs<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Display,
    {
        {
            let mut query = self.config.url.query_pairs_mut();
            for (name, value) in pairs {
                query.append_pair(name.as_ref(), &value.to_string());
            }
        }
        self
    }

    /// Set the body. Structured data (a `serde_json::Value` object or array)
    /// is sent as JSON; bytes and strings are sent as-is.
    pub fn body<P: Into<Payload>>(self, data: P) -> Self {
        self.set_body(RequestBody::encode(data.into(), None))
    }

    /// Set the body with an explicit encoding.
    pub fn body_as<P: Into<Payload>>(self, data: P, encoding: SendDataAs) -> Self {
        self.set_body(RequestBody::encode(data.into(), Some(encoding)))
    }

    /// Serialize `value` as a JSON body.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Self {
        self.set_body(RequestBody::json(value))
    }

    /// Serialize `value` as an URL-encoded form body.
    pub fn form<T: Serialize + ?Sized>(self, value: &T) -> Self {
        self.set_body(RequestBody::form(value))
    }

    fn set_body(mut self, body: Result<RequestBody, NetError>) -> Self {
        match body {
            Ok(body) => self.config.body = body,
            Err(e) => self.record(e),
        }
        self
    }

    /// Set one header. The name is stored lower-cased and replaces any
    /// earlier value for the same name.
    pub fn header<K: AsRef<str>, V: Display>(mut self, name: K, value: V) -> Self {
        match header_from_parts(name.as_ref(), &value.to_string()) {
            Ok((name, value)) => {
                self.config.headers.insert(name, value);
            }
            Err(e) => self.record(e),
        }
        self
    }

    /// Set several headers.
    pub fn headers<I, K, V>(self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Display,
    {
        headers
            .into_iter()
            .fold(self, |builder, (name, value)| builder.header(name, value))
    }

    /// Negotiate gzip/deflate and decode the response accordingly.
    pub fn compress(mut self) -> Self {
        self.config.enable_compression();
        self
    }

    /// Append a path segment, joined filesystem-style.
    pub fn path(mut self, segment: &str) -> Self {
        self.config.append_path(segment);
        self
    }

    /// Deliver the body as a live stream instead of buffering it.
    pub fn stream(mut self) -> Self {
        self.config.streamed = true;
        self
    }

    /// Set a transport override.
    pub fn option<N, V>(mut self, name: N, value: V) -> Self
    where
        N: Into<String>,
        V: Into<serde_json::Value>,
    {
        self.config
            .transport_overrides
            .insert(name.into(), value.into());
        self
    }

    /// Fail the call if it has not settled within `timeout`. Zero disables it.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.set_timeout(timeout);
        self
    }

    /// Decode the buffered body before delivery.
    pub fn parse(mut self, parse: ParseAs) -> Self {
        self.config.parse_as = Some(parse);
        self
    }

    /// Follow `Location` headers.
    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.config.follow_redirects = follow;
        self
    }

    /// Give up after `limit` followed redirects.
    pub fn max_redirects(mut self, limit: usize) -> Self {
        self.config.max_redirects = Some(limit);
        self
    }

    /// Finish configuration without sending.
    pub fn build(self) -> Result<RequestJob, NetError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(RequestJob::new(self.context, self.config)),
        }
    }

    /// Send the request.
    pub async fn send(self) -> Result<Outcome, NetError> {
        self.build()?.start().await
    }
}
