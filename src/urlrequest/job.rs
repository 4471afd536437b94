use crate::base::loadstate::LoadState;
use crate::base::neterror::NetError;
use crate::http::decoder::{self, ContentEncoding};
use crate::http::requestbody::SendDataAs;
use crate::http::response::{Outcome, Response, StreamedResponse};
use crate::http::transport::{Scheme, TransportRequest, TransportResponse};
use crate::urlrequest::config::RequestConfig;
use crate::urlrequest::context::RequestContext;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, LOCATION, USER_AGENT};
use http::HeaderValue;
use std::sync::Arc;
use url::Url;

/// Result of one request/response exchange.
enum Hop {
    Done(Outcome),
    Redirect(Url),
}

/// Executes a finished [`RequestConfig`].
///
/// Each hop opens one transport call. A followed `Location` header replaces
/// the URL and loops; everything else settles the job exactly once.
#[derive(Debug)]
pub struct RequestJob {
    context: Arc<RequestContext>,
    config: RequestConfig,
    state: LoadState,
    redirects: usize,
}

impl RequestJob {
    pub fn new(context: Arc<RequestContext>, config: RequestConfig) -> Self {
        Self {
            context,
            config,
            state: LoadState::Idle,
            redirects: 0,
        }
    }

    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    /// Get the current load state (for progress reporting).
    pub fn load_state(&self) -> LoadState {
        self.state
    }

    /// Number of redirects followed so far.
    pub fn redirect_count(&self) -> usize {
        self.redirects
    }

    /// Run the job to completion.
    pub async fn start(&mut self) -> Result<Outcome, NetError> {
        let result = self.run().await;
        self.state = match result {
            Ok(_) => LoadState::Resolved,
            Err(_) => LoadState::Failed,
        };
        result
    }

    async fn run(&mut self) -> Result<Outcome, NetError> {
        loop {
            // Checked first so unsupported schemes never reach the network.
            let scheme = Scheme::from_url(&self.config.url)?;
            let request = self.prepare(scheme)?;

            tracing::debug!(
                method = %self.config.method,
                url = %self.config.url,
                hop = self.redirects,
                "sending request"
            );
            self.state = LoadState::Sent;

            let hop = match self.config.timeout {
                Some(limit) => match tokio::time::timeout(limit, self.run_hop(request)).await {
                    Ok(hop) => hop,
                    Err(_) => {
                        tracing::warn!(url = %self.config.url, timeout = ?limit, "request timed out");
                        return Err(NetError::TimedOut(limit));
                    }
                },
                None => self.run_hop(request).await,
            };

            match hop {
                Ok(Hop::Done(outcome)) => return Ok(outcome),
                Ok(Hop::Redirect(next)) => {
                    if let Some(limit) = self.config.max_redirects {
                        if self.redirects >= limit {
                            return Err(NetError::TooManyRedirects { limit });
                        }
                    }
                    tracing::debug!(from = %self.config.url, to = %next, "following redirect");
                    self.redirects += 1;
                    self.config.url = next;
                    self.state = LoadState::Redirected;
                }
                Err(e) => {
                    tracing::debug!(url = %self.config.url, error = %e, "request failed");
                    return Err(e);
                }
            }
        }
    }

    /// Compute the transport call for the current URL. Default headers are
    /// only added for requests with a body, and never over caller values.
    fn prepare(&self, scheme: Scheme) -> Result<TransportRequest, NetError> {
        let body = &self.config.body;
        let mut headers = self.config.headers.clone();

        if !body.is_empty() {
            if !headers.contains_key(USER_AGENT) {
                let agent = HeaderValue::from_str(self.context.user_agent()).map_err(|_| {
                    NetError::InvalidHeader {
                        name: USER_AGENT.to_string(),
                    }
                })?;
                headers.insert(USER_AGENT, agent);
            }

            let encoding = body.encoding();
            if let Some(content_type) = encoding.and_then(SendDataAs::content_type) {
                headers
                    .entry(CONTENT_TYPE)
                    .or_insert(HeaderValue::from_static(content_type));
            }
            if encoding == Some(SendDataAs::Form) {
                headers
                    .entry(CONTENT_LENGTH)
                    .or_insert(HeaderValue::from(body.len()));
            }
        }

        let mut request = TransportRequest::from_url(
            scheme,
            &self.config.url,
            self.config.method.clone(),
            headers,
            body.bytes(),
        )?;
        request.apply_overrides(&self.config.transport_overrides)?;
        Ok(request)
    }

    async fn run_hop(&mut self, request: TransportRequest) -> Result<Hop, NetError> {
        let TransportResponse {
            status,
            headers,
            mut body,
        } = self.context.transport().open(request).await?;

        if self.config.compressed {
            if let Some(encoding) = ContentEncoding::from_headers(&headers) {
                tracing::debug!(encoding = encoding.as_str(), "decoding response body");
                body = decoder::decode(body, encoding);
            }
        }

        if self.config.streamed {
            tracing::debug!(url = %self.config.url, status = %status, "handing off body stream");
            self.state = LoadState::Streaming;
            return Ok(Hop::Done(Outcome::Streamed(StreamedResponse::new(
                status,
                headers,
                self.config.url.clone(),
                body,
            ))));
        }

        if self.config.follow_redirects {
            if let Some(location) = headers.get(LOCATION) {
                // The body of a followed hop is dropped unread.
                return self.resolve_location(location).map(Hop::Redirect);
            }
        }

        self.state = LoadState::Buffering;
        let bytes = body.collect_bytes().await?;
        tracing::debug!(url = %self.config.url, status = %status, bytes = bytes.len(), "response buffered");

        let mut response = Response::new(status, headers, self.config.url.clone(), bytes);
        if let Some(parse) = self.config.parse_as {
            response.apply_parse(parse)?;
        }
        Ok(Hop::Done(Outcome::Buffered(response)))
    }

    fn resolve_location(&self, location: &HeaderValue) -> Result<Url, NetError> {
        let location = location
            .to_str()
            .map_err(|_| NetError::InvalidRedirect("non-ASCII Location header".to_string()))?;
        self.config
            .url
            .join(location)
            .map_err(|e| NetError::InvalidRedirect(format!("{location}: {e}")))
    }
}
