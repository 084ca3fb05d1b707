//! Request records and the host environment they are read from.

use std::{collections::BTreeMap, fmt};

/// Query or form parameters.
pub type Params = BTreeMap<String, String>;

/// An uppercased HTTP method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Method(String);

impl Method {
    /// Normalize a raw method name. Empty input means `GET`.
    pub fn new(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Self::get();
        }
        Self(raw.to_ascii_uppercase())
    }

    /// The `GET` method.
    pub fn get() -> Self {
        Self("GET".to_owned())
    }

    /// The method name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Method {
    fn default() -> Self {
        Self::get()
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for Method {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Method {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// The request record seen by route handlers.
///
/// Built once per dispatch from a normalized URI and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    uri: String,
    method: Method,
    query: Params,
    body: Params,
}

impl Request {
    /// Create a request record. `uri` is expected to be normalized already.
    pub fn new(uri: impl Into<String>, method: Method, query: Params, body: Params) -> Self {
        Self {
            uri: uri.into(),
            method,
            query,
            body,
        }
    }

    /// The normalized URI.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The uppercased method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// All query parameters.
    pub fn query(&self) -> &Params {
        &self.query
    }

    /// All body parameters.
    pub fn body(&self) -> &Params {
        &self.body
    }

    /// A single query parameter.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// A single body parameter.
    pub fn body_param(&self, key: &str) -> Option<&str> {
        self.body.get(key).map(String::as_str)
    }
}

/// Raw, unnormalized input to a dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParts {
    /// Raw URI, possibly with query string and base path.
    pub uri: String,
    /// Raw method name.
    pub method: String,
    /// Query parameters.
    pub query: Params,
    /// Body parameters.
    pub body: Params,
}

impl RequestParts {
    /// Raw parts with empty query and body.
    pub fn new(uri: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            method: method.into(),
            query: Params::new(),
            body: Params::new(),
        }
    }

    /// Add a query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Add a body parameter.
    pub fn with_body(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.body.insert(key.into(), value.into());
        self
    }
}

/// The host environment supplying the incoming request.
///
/// Missing values fall back to `/` and `GET`.
pub trait RequestEnvironment {
    /// The raw request URI.
    fn request_uri(&self) -> Option<&str>;

    /// The raw request method.
    fn request_method(&self) -> Option<&str>;

    /// Query parameters.
    fn query(&self) -> Params {
        Params::new()
    }

    /// Body parameters.
    fn body(&self) -> Params {
        Params::new()
    }
}

impl RequestEnvironment for RequestParts {
    fn request_uri(&self) -> Option<&str> {
        Some(&self.uri)
    }

    fn request_method(&self) -> Option<&str> {
        Some(&self.method)
    }

    fn query(&self) -> Params {
        self.query.clone()
    }

    fn body(&self) -> Params {
        self.body.clone()
    }
}
