//! The request half of a dispatch.

use crate::attributes::Attributes;
use std::collections::HashMap;
use std::io::{self, Read};

/// An incoming request, as seen by hooks and handlers.
///
/// A request is built by the server adapter, handed to
/// `App::dispatch`, and dropped when the dispatch returns. The dispatcher
/// installs path captures and the per-request attribute bag before any hook
/// runs; everything else is read-only for the duration of the dispatch.
///
/// The body is a plain [`Read`] stream. Nothing in the dispatch path reads
/// it; whether and when to block on it is entirely the handler's concern.
pub struct Request {
    method: String,
    path: String,
    query_string: String,
    segments: Vec<String>,
    query: HashMap<String, String>,
    headers: HashMap<String, String>,
    captures: HashMap<String, String>,
    attributes: Attributes,
    body: Box<dyn Read + Send>,
}

impl Request {
    /// Create a request from a method and a path.
    ///
    /// The path may carry a query string (`/users?active=1`); it is split
    /// off and kept raw until the dispatcher parses it.
    pub fn new(method: impl Into<String>, path: &str) -> Self {
        let (path, query_string) = match path.split_once('?') {
            Some((p, q)) => (p.to_string(), q.to_string()),
            None => (path.to_string(), String::new()),
        };
        let segments = split_segments(&path);
        Self {
            method: method.into(),
            path,
            query_string,
            segments,
            query: HashMap::new(),
            headers: HashMap::new(),
            captures: HashMap::new(),
            attributes: Attributes::new(),
            body: Box::new(io::empty()),
        }
    }

    /// Shorthand for a GET request.
    pub fn get(path: &str) -> Self {
        Self::new("GET", path)
    }

    /// Shorthand for a HEAD request.
    pub fn head(path: &str) -> Self {
        Self::new("HEAD", path)
    }

    /// Shorthand for a POST request.
    pub fn post(path: &str) -> Self {
        Self::new("POST", path)
    }

    /// Shorthand for a PUT request.
    pub fn put(path: &str) -> Self {
        Self::new("PUT", path)
    }

    /// Shorthand for a DELETE request.
    pub fn delete(path: &str) -> Self {
        Self::new("DELETE", path)
    }

    /// The request method, as the adapter supplied it.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The request path, without the query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The raw, unparsed query string.
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// The path split into segments, with the leading empty segment from an
    /// absolute path stripped and trailing empty segments dropped.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Set a header. Keys are normalized to lowercase.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
    }

    /// Chainable form of [`set_header`](Request::set_header).
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Look up a header, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// The full header mapping, with lowercase keys.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Install the parsed query mapping. Called by the dispatcher; an
    /// adapter that parses queries itself may call it instead.
    pub fn set_query(&mut self, pairs: impl IntoIterator<Item = (String, String)>) {
        self.query = pairs.into_iter().collect();
    }

    /// Install the wildcard captures for this dispatch.
    pub fn set_captures(&mut self, captures: HashMap<String, String>) {
        self.captures = captures;
    }

    /// The wildcard captures recorded while matching the path.
    pub fn captures(&self) -> &HashMap<String, String> {
        &self.captures
    }

    /// Look up a parameter. Path captures take precedence over query
    /// parameters on key collision.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.captures
            .get(key)
            .or_else(|| self.query.get(key))
            .map(String::as_str)
    }

    /// The query parameters merged with the path captures, captures winning.
    pub fn parameters(&self) -> HashMap<String, String> {
        let mut merged = self.query.clone();
        merged.extend(
            self.captures
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        merged
    }

    /// Replace the attribute bag. Called once per dispatch with a shallow
    /// copy of the app's prototype bag.
    pub fn seed_attributes(&mut self, attributes: Attributes) {
        self.attributes = attributes;
    }

    /// The per-request attribute bag.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Mutable access to the per-request attribute bag.
    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    /// Attach a body stream.
    pub fn with_body(mut self, body: Box<dyn Read + Send>) -> Self {
        self.body = body;
        self
    }

    /// The body stream. Reading it may block; the core never does.
    pub fn body_mut(&mut self) -> &mut (dyn Read + Send) {
        self.body.as_mut()
    }
}

/// Split a path into match segments.
///
/// One leading empty segment (from the absolute path's leading slash) is
/// stripped and trailing empty segments are dropped; interior empty segments
/// are kept and will only match a literal empty child.
fn split_segments(path: &str) -> Vec<String> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let trimmed = trimmed.trim_end_matches('/');
    if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed.split('/').map(str::to_owned).collect()
    }
}
