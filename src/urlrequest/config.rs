//! The request configuration a builder accumulates and a job consumes.

use crate::base::neterror::NetError;
use crate::http::decoder::ACCEPT_ENCODING_VALUE;
use crate::http::requestbody::{RequestBody, SendDataAs};
use crate::http::response::ParseAs;
use crate::http::transport::{header_pair, TransportOptions};
use crate::urlrequest::options::RequestOptions;
use http::header::ACCEPT_ENCODING;
use http::{HeaderMap, HeaderValue, Method};
use std::time::Duration;
use url::Url;

/// Everything needed to dispatch a request.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub method: Method,
    pub url: Url,
    /// Case-insensitive; names are stored lower-cased.
    pub headers: HeaderMap,
    pub body: RequestBody,
    pub follow_redirects: bool,
    /// `None` follows redirects without bound.
    pub max_redirects: Option<usize>,
    /// Deliver the body as a stream instead of buffering it.
    pub streamed: bool,
    /// Negotiate and decode gzip/deflate.
    pub compressed: bool,
    pub timeout: Option<Duration>,
    /// Ignored in streamed mode.
    pub parse_as: Option<ParseAs>,
    pub transport_overrides: TransportOptions,
}

impl RequestConfig {
    /// A `GET` for `url` with every flag off.
    pub fn new(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
            follow_redirects: false,
            max_redirects: None,
            streamed: false,
            compressed: false,
            timeout: None,
            parse_as: None,
            transport_overrides: TransportOptions::new(),
        }
    }

    /// Build a configuration from a URL string and an options structure.
    /// `default_method` applies when the options name none.
    pub fn from_options(
        url: &str,
        options: RequestOptions,
        default_method: Method,
    ) -> Result<Self, NetError> {
        let mut config = Self::new(parse_url(url)?);

        config.method = match options.method.as_deref() {
            Some(m) => parse_method(m)?,
            None => default_method,
        };

        for (name, value) in &options.headers {
            let (name, value) = header_pair(name, value)?;
            config.headers.insert(name, value);
        }

        let hint = options.send_data_as;
        let data = options
            .data
            .filter(|v| !v.is_null())
            .or(options.json.filter(|v| !v.is_null()));
        config.body = match (data, options.form) {
            (Some(data), _) => RequestBody::encode(data.into(), hint)?,
            (None, Some(form)) => {
                RequestBody::encode(form.into(), Some(hint.unwrap_or(SendDataAs::Form)))?
            }
            (None, None) => RequestBody::Empty,
        };

        config.follow_redirects = options.follow_redirects;
        config.max_redirects = options.max_redirects;
        config.streamed = options.streamed;
        config.parse_as = options.parse;
        if options.compressed {
            config.enable_compression();
        }
        if let Some(ms) = options.timeout {
            config.set_timeout(Duration::from_millis(ms));
        }

        config.transport_overrides = options.core_options;
        for (name, value) in options.core {
            config.transport_overrides.insert(name, value);
        }

        Ok(config)
    }

    /// Turn on compression, advertising it unless the caller already set
    /// `Accept-Encoding`.
    pub fn enable_compression(&mut self) {
        self.compressed = true;
        self.headers
            .entry(ACCEPT_ENCODING)
            .or_insert(HeaderValue::from_static(ACCEPT_ENCODING_VALUE));
    }

    /// A zero duration disables the timeout.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = (!timeout.is_zero()).then_some(timeout);
    }

    /// Append `segment` to the URL path.
    pub fn append_path(&mut self, segment: &str) {
        let joined = join_path(self.url.path(), segment);
        self.url.set_path(&joined);
    }
}

pub fn parse_url(url: &str) -> Result<Url, NetError> {
    Url::parse(url).map_err(|e| NetError::InvalidUrl(format!("{url}: {e}")))
}

/// Parse a method name, case-insensitively.
pub fn parse_method(method: &str) -> Result<Method, NetError> {
    let upper = method.to_ascii_uppercase();
    Method::from_bytes(upper.as_bytes()).map_err(|_| NetError::InvalidMethod(method.to_string()))
}

/// Join two paths the way a filesystem would: `.` is dropped, `..` pops a
/// segment, duplicate slashes collapse and a trailing slash is kept.
pub fn join_path(base: &str, segment: &str) -> String {
    let trailing = if segment.is_empty() {
        base.ends_with('/')
    } else {
        segment.ends_with('/')
    };

    let mut parts: Vec<&str> = Vec::new();
    for part in base.split('/').chain(segment.split('/')) {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            p => parts.push(p),
        }
    }

    let mut out = String::with_capacity(base.len() + segment.len() + 1);
    out.push('/');
    out.push_str(&parts.join("/"));
    if trailing && !parts.is_empty() {
        out.push('/');
    }
    out
}
