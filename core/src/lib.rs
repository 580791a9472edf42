//! Convenience layer over a blocking HTTP client.
//!
//! # Overview
//! One function per verb (`get`, `post`, `put`, `delete`, `patch`,
//! `options`), each taking a URL and a list of options: query params, JSON
//! or form body, headers, timeout, redirect policy and TLS verification. The
//! result is a fully buffered `Response` with on-demand JSON decoding.
//!
//! ```no_run
//! use requests_core::{get, with_params};
//!
//! let resp = get("https://example.com/search", [with_params([("q", "rust")])])?;
//! let body = resp.json()?;
//! # Ok::<(), requests_core::Error>(())
//! ```
//!
//! # Design
//! - Calls run synchronously on the caller's thread; the only suspension is
//!   network I/O, bounded by the per-call timeout (30 s by default).
//! - Configuration records come from a pool and are reset before use; the
//!   executing client is built fresh for each call so no state leaks.
//! - The outbound request is built as plain data (`HttpRequest`) before any
//!   I/O, so construction errors never reach the network.
//! - 4xx/5xx and suppressed redirects are responses, not errors.

pub mod builder;
pub mod client;
pub mod error;
pub mod http;
pub mod options;
pub mod pool;
pub mod response;
pub mod transport;

pub use builder::build_request;
pub use client::{delete, get, options, patch, post, put, request};
pub use error::Error;
pub use http::{HttpMethod, HttpRequest};
pub use options::{
    with_allow_redirects, with_form, with_headers, with_json, with_params, with_timeout,
    with_verify, RequestConfig, RequestOption,
};
pub use pool::{Pool, Pooled, Reset};
pub use response::{JsonTarget, Response};
pub use transport::{TransportProfile, DEFAULT_TIMEOUT, MAX_TIMEOUT};
