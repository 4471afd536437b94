//! Request Context - process-wide settings shared by every request.
//!
//! A context carries the default `User-Agent` and the [`Transport`] jobs
//! dispatch through. It is read-only once built; the free functions in the
//! crate root use a lazily created default.

use crate::base::neterror::NetError;
use crate::http::streamfactory::HttpStreamFactory;
use crate::http::transport::Transport;
use crate::urlrequest::options::RequestIntent;
use crate::urlrequest::request::RequestBuilder;
use http::Method;
use once_cell::sync::Lazy;
use std::fmt;
use std::sync::Arc;

static DEFAULT_CONTEXT: Lazy<Arc<RequestContext>> = Lazy::new(|| Arc::new(RequestContext::new()));

pub struct RequestContext {
    /// Sent with requests that carry a body and set no `User-Agent`.
    user_agent: String,

    transport: Arc<dyn Transport>,
}

impl RequestContext {
    /// Create a context with the crate's User-Agent and the HTTP/1.1 transport.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> RequestContextBuilder {
        RequestContextBuilder::default()
    }

    /// The shared context behind [`crate::request`] and the per-verb helpers.
    pub fn shared() -> Arc<Self> {
        Arc::clone(&DEFAULT_CONTEXT)
    }

    /// Get the user agent string.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Start a request bound to this context.
    pub fn request<I: Into<RequestIntent>>(
        self: &Arc<Self>,
        intent: I,
    ) -> Result<RequestBuilder, NetError> {
        RequestBuilder::with_context(Arc::clone(self), intent.into(), None)
    }

    /// Start a request with `method` pre-set, bound to this context.
    pub fn request_with_method<I: Into<RequestIntent>>(
        self: &Arc<Self>,
        method: Method,
        intent: I,
    ) -> Result<RequestBuilder, NetError> {
        RequestBuilder::with_context(Arc::clone(self), intent.into(), Some(method))
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

/// Builder for a [`RequestContext`].
#[derive(Default)]
pub struct RequestContextBuilder {
    user_agent: Option<String>,
    transport: Option<Arc<dyn Transport>>,
}

impl RequestContextBuilder {
    /// Override the default User-Agent.
    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Dispatch through a custom transport.
    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> RequestContext {
        RequestContext {
            user_agent: self
                .user_agent
                .unwrap_or_else(|| crate::USER_AGENT.to_string()),
            transport: self
                .transport
                .unwrap_or_else(|| Arc::new(HttpStreamFactory::new())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_user_agent() {
        let ctx = RequestContext::new();
        assert_eq!(ctx.user_agent(), crate::USER_AGENT);
        assert!(ctx.user_agent().starts_with("chainfetch/"));
    }

    #[test]
    fn test_shared_is_a_singleton() {
        assert!(Arc::ptr_eq(&RequestContext::shared(), &RequestContext::shared()));
    }

    #[test]
    fn test_custom_user_agent() {
        let ctx = RequestContext::builder().user_agent("agent/1.0").build();
        assert_eq!(ctx.user_agent(), "agent/1.0");
    }
}
