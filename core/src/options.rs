//! Per-call configuration record and the options that mutate it.
//!
//! # Design
//! `RequestConfig` is a plain struct with named fields; `RequestOption` is the
//! declarative form of one setting, so callers can pass a list of options to
//! a verb helper and have them applied in order. Options never validate their
//! values: a bad header name or an unencodable body shows up later as a
//! construction or transport error.
//!
//! When two options touch the same field the last one applied wins. Headers
//! are merged by key, so `with_headers` can be passed more than once.

use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::Value;

use crate::pool::Reset;

/// Settings for a single call.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestConfig {
    pub allow_redirects: bool,
    pub verify: bool,
    /// `None` or zero means the transport default.
    pub timeout: Option<Duration>,
    pub params: Option<BTreeMap<String, String>>,
    pub json: Option<Value>,
    pub form: Option<BTreeMap<String, String>>,
    pub headers: Option<BTreeMap<String, String>>,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            allow_redirects: true,
            verify: true,
            timeout: None,
            params: None,
            json: None,
            form: None,
            headers: None,
        }
    }
}

impl Reset for RequestConfig {
    fn reset(&mut self) {
        *self = RequestConfig::default();
    }
}

impl RequestConfig {
    /// Apply options in order on top of the current values.
    pub fn apply<I>(&mut self, options: I)
    where
        I: IntoIterator<Item = RequestOption>,
    {
        for option in options {
            option.apply(self);
        }
    }
}

/// One named setting of a `RequestConfig`.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOption {
    /// Query parameters merged into the URL. Replaces earlier params.
    Params(BTreeMap<String, String>),
    /// JSON body. Takes precedence over `Form` for body-carrying verbs.
    Json(Value),
    /// `application/x-www-form-urlencoded` body.
    Form(BTreeMap<String, String>),
    /// Extra request headers, merged by key.
    Headers(BTreeMap<String, String>),
    Timeout(Duration),
    AllowRedirects(bool),
    /// TLS certificate verification.
    Verify(bool),
}

impl RequestOption {
    pub fn apply(self, config: &mut RequestConfig) {
        match self {
            RequestOption::Params(params) => config.params = Some(params),
            RequestOption::Json(json) => config.json = Some(json),
            RequestOption::Form(form) => config.form = Some(form),
            RequestOption::Headers(headers) => {
                config.headers.get_or_insert_with(BTreeMap::new).extend(headers);
            }
            RequestOption::Timeout(timeout) => config.timeout = Some(timeout),
            RequestOption::AllowRedirects(allow) => config.allow_redirects = allow,
            RequestOption::Verify(verify) => config.verify = verify,
        }
    }
}

fn string_map<I, K, V>(pairs: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

pub fn with_params<I, K, V>(params: I) -> RequestOption
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    RequestOption::Params(string_map(params))
}

pub fn with_json(json: impl Into<Value>) -> RequestOption {
    RequestOption::Json(json.into())
}

pub fn with_form<I, K, V>(form: I) -> RequestOption
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    RequestOption::Form(string_map(form))
}

pub fn with_headers<I, K, V>(headers: I) -> RequestOption
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    RequestOption::Headers(string_map(headers))
}

pub fn with_timeout(timeout: Duration) -> RequestOption {
    RequestOption::Timeout(timeout)
}

pub fn with_allow_redirects(allow: bool) -> RequestOption {
    RequestOption::AllowRedirects(allow)
}

pub fn with_verify(verify: bool) -> RequestOption {
    RequestOption::Verify(verify)
}
