//! Error types for request construction, transport and response decoding.
//!
//! # Design
//! Errors fall into three groups that surface at different times:
//! construction errors (`InvalidUrl`, `Serialization`) are returned before any
//! network attempt, transport errors (`Timeout`, `Connection`, `Tls`,
//! `Transport`) come from the executing client as-is, and decode errors
//! (`Decode`, `TooManyTargets`) only appear when a caller asks a `Response`
//! to parse its body. Non-2xx statuses are not errors; they are returned as
//! ordinary responses.

use std::io;

use thiserror::Error;

/// Errors returned by the request helpers and `Response` decoders.
#[derive(Debug, Error)]
pub enum Error {
    /// The target URL could not be parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// The outbound JSON or form body could not be encoded.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The per-call deadline elapsed before the response was read.
    #[error("request timed out")]
    Timeout,

    /// Connecting to the host failed, or the connection broke mid-call.
    #[error("connection error: {0}")]
    Connection(String),

    /// TLS handshake or certificate validation failed.
    #[error("tls error: {0}")]
    Tls(String),

    /// Any other failure reported by the underlying client.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body is not valid JSON for the requested shape.
    #[error("decode failed: {0}")]
    Decode(String),

    /// A decoder was handed more than one destination.
    #[error("too many decode targets: got {0}, max is 1")]
    TooManyTargets(usize),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(err.to_string())
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Timeout(_) => Error::Timeout,
            ureq::Error::Io(io_err) => from_io(io_err),
            ureq::Error::ConnectionFailed | ureq::Error::HostNotFound => {
                Error::Connection(err.to_string())
            }
            ureq::Error::BadUri(msg) => Error::InvalidUrl(msg),
            ureq::Error::Tls(msg) => Error::Tls(msg.to_string()),
            ureq::Error::Rustls(tls_err) => Error::Tls(tls_err.to_string()),
            other => Error::Transport(other.to_string()),
        }
    }
}

// The handshake runs over `io::Read`/`io::Write`, so certificate failures
// arrive as an `io::Error` wrapping the rustls error.
fn from_io(err: io::Error) -> Error {
    if err
        .get_ref()
        .is_some_and(|inner| inner.is::<rustls::Error>())
    {
        return Error::Tls(err.to_string());
    }
    match err.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Error::Timeout,
        _ => Error::Connection(err.to_string()),
    }
}
