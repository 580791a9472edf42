//! Buffered response with on-demand JSON decoding.
//!
//! # Design
//! A `Response` is immutable once built: status, flattened headers and the
//! whole body in memory. Decoders re-parse the buffered body on every call
//! and cache nothing, so they can be called repeatedly and in any order.
//!
//! Header names are stored lower-case (as the `http` crate normalizes them);
//! repeated values for one name are joined with commas.
//!
//! `json_to` / `list_to` accept zero or one destination. With none they
//! return the generic value; with one they fill it and return `None`; more
//! than one is `Error::TooManyTargets`.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use ureq::http::HeaderMap;

use crate::error::Error;

/// A decode destination. Implemented for every `DeserializeOwned` type.
pub trait JsonTarget {
    fn decode_from(&mut self, body: &[u8]) -> Result<(), Error>;
}

impl<T: DeserializeOwned> JsonTarget for T {
    fn decode_from(&mut self, body: &[u8]) -> Result<(), Error> {
        *self = serde_json::from_slice(body)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl Response {
    /// Names that collide once lower-cased are comma-joined, as on the wire.
    pub fn new(status: u16, headers: HashMap<String, String>, body: Vec<u8>) -> Self {
        let mut merged: HashMap<String, String> = HashMap::with_capacity(headers.len());
        for (name, value) in headers {
            merged
                .entry(name.to_ascii_lowercase())
                .and_modify(|existing| {
                    existing.push(',');
                    existing.push_str(&value);
                })
                .or_insert(value);
        }
        Self {
            status,
            headers: merged,
            body,
        }
    }

    pub(crate) fn from_parts(status: u16, headers: &HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status,
            headers: flatten_headers(headers),
            body,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Case-insensitive single-header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as a JSON object.
    pub fn json(&self) -> Result<Map<String, Value>, Error> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Decode the body as a JSON array.
    pub fn list(&self) -> Result<Vec<Value>, Error> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn json_into<T: DeserializeOwned>(&self) -> Result<T, Error> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Decode a JSON object whose values are all strings.
    pub fn json_strings(&self) -> Result<HashMap<String, String>, Error> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn json_to(
        &self,
        targets: &mut [&mut dyn JsonTarget],
    ) -> Result<Option<Map<String, Value>>, Error> {
        match targets {
            [] => self.json().map(Some),
            [target] => (**target).decode_from(&self.body).map(|()| None),
            _ => Err(Error::TooManyTargets(targets.len())),
        }
    }

    pub fn list_to(&self, targets: &mut [&mut dyn JsonTarget]) -> Result<Option<Vec<Value>>, Error> {
        match targets {
            [] => self.list().map(Some),
            [target] => (**target).decode_from(&self.body).map(|()| None),
            _ => Err(Error::TooManyTargets(targets.len())),
        }
    }
}

/// Collapse a header multimap to one comma-joined value per name.
pub fn flatten_headers(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .keys()
        .map(|name| {
            let joined = headers
                .get_all(name)
                .iter()
                .map(|value| String::from_utf8_lossy(value.as_bytes()))
                .collect::<Vec<_>>()
                .join(",");
            (name.as_str().to_string(), joined)
        })
        .collect()
}
