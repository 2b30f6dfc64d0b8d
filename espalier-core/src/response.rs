//! The response half of a dispatch.

use std::collections::HashMap;

/// A response body value, as produced by handlers.
///
/// The raw/streaming override channel lives on [`Response`]; a `Body` is the
/// plain value form with the defaulting rules of the wire conversion:
/// text becomes a single chunk, `Empty` transmits nothing, chunk lists pass
/// through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Body {
    /// No body.
    #[default]
    Empty,
    /// A text body, transmitted as a single chunk.
    Text(String),
    /// A binary body, transmitted as a single chunk.
    Bytes(Vec<u8>),
    /// An already-chunked body, passed through unchanged.
    Chunks(Vec<Vec<u8>>),
}

impl Body {
    /// Convert into wire chunks.
    pub fn into_chunks(self) -> Vec<Vec<u8>> {
        match self {
            Body::Empty => Vec::new(),
            Body::Text(s) => vec![s.into_bytes()],
            Body::Bytes(b) => vec![b],
            Body::Chunks(c) => c,
        }
    }
}

impl From<&str> for Body {
    fn from(s: &str) -> Self {
        Body::Text(s.to_string())
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Body::Text(s)
    }
}

impl From<Vec<u8>> for Body {
    fn from(b: Vec<u8>) -> Self {
        Body::Bytes(b)
    }
}

impl From<()> for Body {
    fn from(_: ()) -> Self {
        Body::Empty
    }
}

/// The mutable response being assembled over a dispatch.
///
/// Status defaults to 200. The `finished` flag lets a hook veto the rest of
/// the pipeline: once set, remaining before-hooks and the handler are
/// skipped, and a handler's return value is no longer adopted as the body.
/// After-hooks still run for the levels whose before-hooks got to execute.
#[derive(Debug)]
pub struct Response {
    status: u16,
    headers: HashMap<String, String>,
    body: Option<Body>,
    raw_body: Option<Vec<Vec<u8>>>,
    finished: bool,
}

impl Response {
    /// Create a fresh response: status 200, no headers, no body.
    pub fn new() -> Self {
        Self {
            status: 200,
            headers: HashMap::new(),
            body: None,
            raw_body: None,
            finished: false,
        }
    }

    /// The response status.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Set the response status.
    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    /// Look up a header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Set a header.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    /// The full header mapping.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Mutable access to the header mapping.
    pub fn headers_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.headers
    }

    /// The body value, if one was set.
    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    /// Set the body value.
    pub fn set_body(&mut self, body: impl Into<Body>) {
        self.body = Some(body.into());
    }

    /// Install a raw chunk override. It wins over any body value when the
    /// response is converted for the wire.
    pub fn set_raw_body(&mut self, chunks: Vec<Vec<u8>>) {
        self.raw_body = Some(chunks);
    }

    /// Whether a raw override is installed.
    pub fn has_raw_body(&self) -> bool {
        self.raw_body.is_some()
    }

    /// Force an empty transmitted body, regardless of any body value set
    /// before or after.
    pub fn no_body(&mut self) {
        self.raw_body = Some(Vec::new());
    }

    /// Mark the response finished, vetoing further pipeline execution.
    pub fn finish(&mut self) {
        self.finished = true;
    }

    /// Whether the response has been marked finished.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Convert into (status, headers, body chunks) for the wire adapter.
    ///
    /// The raw override wins when present; otherwise the body value is
    /// chunked per its defaulting rules, and no body at all means no chunks.
    pub fn into_parts(self) -> (u16, HashMap<String, String>, Vec<Vec<u8>>) {
        let chunks = match self.raw_body {
            Some(raw) => raw,
            None => self.body.unwrap_or_default().into_chunks(),
        };
        (self.status, self.headers, chunks)
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}
