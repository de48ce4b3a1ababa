use std::collections::HashMap;

use bytes::Bytes;

use crate::http::headers::HeaderMap;

/// Route parameters bound by the router, keyed by the `:name` in the pattern.
pub type Params = HashMap<String, String>;

/// Represents a parsed HTTP request from a client.
///
/// Built once per connection by the parser. The router fills in `params`
/// after a route matches; nothing else changes it afterwards.
#[derive(Debug, Clone, Default)]
pub struct Request {
    /// The HTTP method, passed through verbatim (e.g. "GET")
    pub method: String,
    /// The request target as received, query string included
    pub path: String,
    /// Protocol version token (typically "HTTP/1.1")
    pub version: String,
    /// Request headers
    pub headers: HeaderMap,
    /// Decoded route parameters
    pub params: Params,
    /// Bytes that followed the header block in the same read, uninterpreted
    pub body: Bytes,
}

/// Builder for constructing Request objects.
#[derive(Default)]
pub struct RequestBuilder {
    method: Option<String>,
    path: Option<String>,
    version: Option<String>,
    headers: HeaderMap,
    body: Bytes,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn header(mut self, key: &str, value: impl Into<String>) -> Self {
        self.headers.add(key, value);
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        Ok(Request {
            method: self.method.ok_or("method missing")?,
            path: self.path.ok_or("path missing")?,
            version: self.version.unwrap_or_else(|| "HTTP/1.1".to_string()),
            headers: self.headers,
            params: Params::new(),
            body: self.body,
        })
    }
}

impl Request {
    /// Returns the first value of a header, matched case-insensitively.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    /// Returns a route parameter bound by the router.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(|v| v.as_str())
    }

    /// The path with any `?query` suffix removed.
    pub fn path_without_query(&self) -> &str {
        strip_query(&self.path)
    }

    /// The raw query string after `?`, if present.
    pub fn query(&self) -> Option<&str> {
        self.path.split_once('?').map(|(_, q)| q)
    }
}

pub(crate) fn strip_query(path: &str) -> &str {
    match path.split_once('?') {
        Some((p, _)) => p,
        None => path,
    }
}
