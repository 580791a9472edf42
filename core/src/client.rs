//! Per-verb request helpers and the shared call pipeline.
//!
//! # Design
//! Every helper forwards to `request`, which runs one call start to finish on
//! the caller's thread:
//! 1. draw a `RequestConfig` from the process-wide pool (already reset),
//! 2. apply the caller's options in order,
//! 3. build the outbound request,
//! 4. derive a transport profile and execute,
//! 5. return the buffered `Response`.
//!
//! The pooled config lives in a guard for the whole call and goes back to the
//! pool when `request` returns, on success and on every error path.

use crate::builder::build_request;
use crate::error::Error;
use crate::http::HttpMethod;
use crate::options::{RequestConfig, RequestOption};
use crate::pool::Pool;
use crate::response::Response;
use crate::transport::{execute, TransportProfile};

const CONFIG_POOL_CAPACITY: usize = 64;

static CONFIG_POOL: Pool<RequestConfig> = Pool::new(CONFIG_POOL_CAPACITY);

/// Send a `method` request to `url` configured by `options`.
pub fn request<I>(method: HttpMethod, url: &str, options: I) -> Result<Response, Error>
where
    I: IntoIterator<Item = RequestOption>,
{
    let mut config = CONFIG_POOL.acquire();
    config.apply(options);

    let request = build_request(method, url, &config)?;
    let profile = TransportProfile::from_config(&config);
    execute(&profile, request)
}

pub fn get<I>(url: &str, options: I) -> Result<Response, Error>
where
    I: IntoIterator<Item = RequestOption>,
{
    request(HttpMethod::Get, url, options)
}

pub fn post<I>(url: &str, options: I) -> Result<Response, Error>
where
    I: IntoIterator<Item = RequestOption>,
{
    request(HttpMethod::Post, url, options)
}

pub fn put<I>(url: &str, options: I) -> Result<Response, Error>
where
    I: IntoIterator<Item = RequestOption>,
{
    request(HttpMethod::Put, url, options)
}

pub fn delete<I>(url: &str, options: I) -> Result<Response, Error>
where
    I: IntoIterator<Item = RequestOption>,
{
    request(HttpMethod::Delete, url, options)
}

pub fn patch<I>(url: &str, options: I) -> Result<Response, Error>
where
    I: IntoIterator<Item = RequestOption>,
{
    request(HttpMethod::Patch, url, options)
}

pub fn options<I>(url: &str, options: I) -> Result<Response, Error>
where
    I: IntoIterator<Item = RequestOption>,
{
    request(HttpMethod::Options, url, options)
}
