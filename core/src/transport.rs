//! Configures and runs the executing client for one call.
//!
//! # Design
//! A `TransportProfile` holds the transport-facing part of a `RequestConfig`
//! (deadline, redirect policy, certificate verification). Each call builds a
//! fresh `ureq::Agent` from its profile, so connection pools and cookie jars
//! never carry over between calls with different settings. With the
//! `cookies` feature every agent starts with an empty jar; cookies set on a
//! redirect hop are replayed on the next hop of the same call only.
//!
//! Redirect suppression stops at the first hop and hands back that 3xx
//! response with its `Location` header; it is not an error.

use std::time::Duration;

use tracing::{debug, warn};
use ureq::http;
use ureq::tls::TlsConfig;
use ureq::Agent;

use crate::error::Error;
use crate::http::{HttpMethod, HttpRequest};
use crate::options::RequestConfig;
use crate::response::Response;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Longest deadline handed to the client. Larger values are clamped; the
/// client measures deadlines from `Instant::now()` and would overflow.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(365 * 24 * 60 * 60);
pub const MAX_REDIRECTS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportProfile {
    pub timeout: Duration,
    pub allow_redirects: bool,
    pub verify: bool,
}

impl Default for TransportProfile {
    fn default() -> Self {
        Self::from_config(&RequestConfig::default())
    }
}

impl TransportProfile {
    /// An unset or zero timeout maps to `DEFAULT_TIMEOUT`, never to "no deadline".
    /// Anything above `MAX_TIMEOUT` is clamped to it.
    pub fn from_config(config: &RequestConfig) -> Self {
        Self {
            timeout: config
                .timeout
                .filter(|t| !t.is_zero())
                .unwrap_or(DEFAULT_TIMEOUT)
                .min(MAX_TIMEOUT),
            allow_redirects: config.allow_redirects,
            verify: config.verify,
        }
    }

    pub fn max_redirects(&self) -> u32 {
        if self.allow_redirects {
            MAX_REDIRECTS
        } else {
            0
        }
    }

    pub fn agent(&self) -> Agent {
        let tls = TlsConfig::builder()
            .disable_verification(!self.verify)
            .build();

        Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(self.timeout))
            .max_redirects(self.max_redirects())
            .max_redirects_will_error(self.allow_redirects)
            .tls_config(tls)
            .build()
            .new_agent()
    }
}

/// Execute `request` on a client configured from `profile`, buffering the
/// whole response body.
pub fn execute(profile: &TransportProfile, request: HttpRequest) -> Result<Response, Error> {
    debug!(
        method = %request.method,
        url = %request.url,
        timeout_ms = profile.timeout.as_millis() as u64,
        allow_redirects = profile.allow_redirects,
        verify = profile.verify,
        "dispatching request"
    );
    if !profile.verify {
        warn!(url = %request.url, "TLS certificate verification disabled for this call");
    }

    let agent = profile.agent();
    let mut response = dispatch(&agent, request)?;

    let status = response.status().as_u16();
    let headers = response.headers().clone();
    let body = response
        .body_mut()
        .with_config()
        .limit(u64::MAX)
        .read_to_vec()?;

    debug!(status, body_len = body.len(), "response received");
    Ok(Response::from_parts(status, &headers, body))
}

fn dispatch(agent: &Agent, request: HttpRequest) -> Result<http::Response<ureq::Body>, Error> {
    let HttpRequest {
        method,
        url,
        headers,
        body,
    } = request;
    let url = url.as_str();

    let response = match method {
        HttpMethod::Get => apply_headers(agent.get(url), &headers).call(),
        HttpMethod::Delete => match body {
            Some(body) => apply_headers(agent.delete(url), &headers)
                .force_send_body()
                .send(body),
            None => apply_headers(agent.delete(url), &headers).call(),
        },
        HttpMethod::Options => match body {
            Some(body) => apply_headers(agent.options(url), &headers)
                .force_send_body()
                .send(body),
            None => apply_headers(agent.options(url), &headers).call(),
        },
        HttpMethod::Post => send(apply_headers(agent.post(url), &headers), body),
        HttpMethod::Put => send(apply_headers(agent.put(url), &headers), body),
        HttpMethod::Patch => send(apply_headers(agent.patch(url), &headers), body),
    };

    Ok(response?)
}

fn apply_headers<B>(
    builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    headers
        .iter()
        .fold(builder, |builder, (name, value)| {
            builder.header(name.as_str(), value.as_str())
        })
}

fn send(
    builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    body: Option<Vec<u8>>,
) -> Result<http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body),
        None => builder.send_empty(),
    }
}
