//! Turns a URL, a verb and a `RequestConfig` into an `HttpRequest`.
//!
//! # Design
//! Body selection is evaluated once: GET never carries a body; otherwise a
//! JSON body wins over form data, and the content type follows the chosen
//! encoding. Explicit headers are applied after the derived content type so
//! they can override it. Query parameters extend any query string already in
//! the URL. Every request asks the server to close the connection when done.

use url::Url;

use crate::error::Error;
use crate::http::{HttpMethod, HttpRequest};
use crate::options::RequestConfig;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

/// Build the outbound request. Fails without touching the network.
pub fn build_request(
    method: HttpMethod,
    url: &str,
    config: &RequestConfig,
) -> Result<HttpRequest, Error> {
    let mut url = Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{url}: {e}")))?;

    if let Some(params) = config.params.as_ref().filter(|p| !p.is_empty()) {
        url.query_pairs_mut().extend_pairs(params.iter());
    }

    let (body, content_type) = encode_body(method, config)?;

    let mut request = HttpRequest {
        method,
        url: url.into(),
        headers: Vec::new(),
        body,
    };

    if let Some(content_type) = content_type {
        request.set_header("content-type", content_type);
    }
    if let Some(headers) = &config.headers {
        for (name, value) in headers {
            request.set_header(name, value);
        }
    }
    request.set_header("connection", "close");

    Ok(request)
}

fn encode_body(
    method: HttpMethod,
    config: &RequestConfig,
) -> Result<(Option<Vec<u8>>, Option<&'static str>), Error> {
    if !method.carries_body() {
        return Ok((None, None));
    }
    if let Some(json) = &config.json {
        let bytes = serde_json::to_vec(json).map_err(|e| Error::Serialization(e.to_string()))?;
        return Ok((Some(bytes), Some(CONTENT_TYPE_JSON)));
    }
    if let Some(form) = &config.form {
        let encoded =
            serde_urlencoded::to_string(form).map_err(|e| Error::Serialization(e.to_string()))?;
        return Ok((Some(encoded.into_bytes()), Some(CONTENT_TYPE_FORM)));
    }
    Ok((None, None))
}
