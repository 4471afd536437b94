//! Loosely typed request options and the constructor input union.

use crate::base::neterror::NetError;
use crate::http::requestbody::SendDataAs;
use crate::http::response::ParseAs;
use crate::http::transport::TransportOptions;
use http::Method;
use serde::Deserialize;
use serde_json::{Map, Value};
use url::Url;

/// The options structure accepted when constructing a request.
///
/// Deserializes from camelCase keys, so a request can be described in JSON:
///
/// ```rust,ignore
/// let options: RequestOptions = serde_json::from_str(r#"{
///     "url": "https://example.com/api",
///     "method": "post",
///     "json": {"name": "value"},
///     "parse": "json",
///     "timeout": 5000
/// }"#)?;
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestOptions {
    pub method: Option<String>,
    pub url: Option<String>,
    /// Body payload. Objects and arrays are sent as JSON unless
    /// `send_data_as` says otherwise.
    pub data: Option<Value>,
    /// Body payload, used when `data` is absent.
    pub json: Option<Value>,
    /// Form fields, URL-encoded. Used when `data` and `json` are absent.
    pub form: Option<Value>,
    pub send_data_as: Option<SendDataAs>,
    pub parse: Option<ParseAs>,
    pub follow_redirects: bool,
    pub max_redirects: Option<usize>,
    pub headers: Map<String, Value>,
    pub streamed: bool,
    pub compressed: bool,
    /// Milliseconds; `0` disables the timeout.
    pub timeout: Option<u64>,
    /// Initial transport overrides.
    pub core_options: TransportOptions,
    /// Transport overrides applied one by one through `option()`.
    pub core: TransportOptions,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }
}

/// What a request is built from: a URL with an optional method or options,
/// or a complete options structure carrying its own `url`.
#[derive(Debug, Clone)]
pub enum RequestIntent {
    Url { url: String, method: Option<String> },
    UrlWithOptions { url: String, options: RequestOptions },
    Options(RequestOptions),
}

impl RequestIntent {
    /// Split into the URL string and the options. Fails with
    /// [`NetError::MissingUrl`] when no URL is present.
    pub(crate) fn into_parts(self) -> Result<(String, RequestOptions), NetError> {
        match self {
            RequestIntent::Url { url, method } => Ok((
                url,
                RequestOptions {
                    method,
                    ..RequestOptions::default()
                },
            )),
            RequestIntent::UrlWithOptions { url, options } => Ok((url, options)),
            RequestIntent::Options(mut options) => {
                let url = options.url.take().ok_or(NetError::MissingUrl)?;
                Ok((url, options))
            }
        }
    }
}

impl From<&str> for RequestIntent {
    fn from(url: &str) -> Self {
        RequestIntent::Url {
            url: url.to_string(),
            method: None,
        }
    }
}

impl From<String> for RequestIntent {
    fn from(url: String) -> Self {
        RequestIntent::Url { url, method: None }
    }
}

impl From<Url> for RequestIntent {
    fn from(url: Url) -> Self {
        RequestIntent::Url {
            url: url.into(),
            method: None,
        }
    }
}

impl From<&Url> for RequestIntent {
    fn from(url: &Url) -> Self {
        RequestIntent::Url {
            url: url.to_string(),
            method: None,
        }
    }
}

impl From<(&str, &str)> for RequestIntent {
    fn from((url, method): (&str, &str)) -> Self {
        RequestIntent::Url {
            url: url.to_string(),
            method: Some(method.to_string()),
        }
    }
}

impl From<(&str, Method)> for RequestIntent {
    fn from((url, method): (&str, Method)) -> Self {
        RequestIntent::Url {
            url: url.to_string(),
            method: Some(method.to_string()),
        }
    }
}

impl From<(String, Method)> for RequestIntent {
    fn from((url, method): (String, Method)) -> Self {
        RequestIntent::Url {
            url,
            method: Some(method.to_string()),
        }
    }
}

impl From<(&str, RequestOptions)> for RequestIntent {
    fn from((url, options): (&str, RequestOptions)) -> Self {
        RequestIntent::UrlWithOptions {
            url: url.to_string(),
            options,
        }
    }
}

impl From<(String, RequestOptions)> for RequestIntent {
    fn from((url, options): (String, RequestOptions)) -> Self {
        RequestIntent::UrlWithOptions { url, options }
    }
}

impl From<RequestOptions> for RequestIntent {
    fn from(options: RequestOptions) -> Self {
        RequestIntent::Options(options)
    }
}
