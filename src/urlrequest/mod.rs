//! High-level request API.
//!
//! - [`request`]: the chainable [`RequestBuilder`](request::RequestBuilder)
//! - [`job`]: the executor that runs a finished configuration
//! - [`config`], [`options`]: the configuration model and its loose input form
//! - [`context`]: process-wide settings and transport injection

pub mod config;
pub mod context;
pub mod job;
pub mod options;
pub mod request;

pub use config::RequestConfig;
pub use context::RequestContext;
pub use job::RequestJob;
pub use options::{RequestIntent, RequestOptions};
pub use request::RequestBuilder;
