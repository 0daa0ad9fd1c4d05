use std::borrow::Cow;
use std::sync::Arc;

use http::Method;

use crate::dispatcher::HeaderVec;

/// Read/write facade over one in-flight request/response pair.
///
/// Header name lookups are case-insensitive per RFC 7230. Implementations must
/// keep `add_header_value` additive: writing the same header twice yields two
/// values, exactly like a real response header map.
pub trait ExchangeView {
    /// First value of the named request header, if present.
    fn header_first(&self, name: &str) -> Option<&str>;

    /// Full request URL including scheme, host, port, path and query.
    fn full_url(&self) -> Cow<'_, str>;

    /// HTTP method of the request.
    fn method(&self) -> &Method;

    /// Whether the request carries at least one cookie.
    fn request_contains_cookies(&self) -> bool;

    /// Whether the response headers have already been flushed to the wire.
    fn is_headers_sent(&self) -> bool;

    fn set_status_code(&mut self, status: u16);

    fn add_header_value(&mut self, name: &str, value: String);

    /// Drop everything staged on the response so far (headers, body, status).
    fn reset_everything(&mut self);
}

/// Self-contained, in-memory exchange.
///
/// Holds its own request headers, cookies and staged response. Used by the CLI
/// to evaluate a request described on the command line, and by tests.
#[derive(Debug, Clone)]
pub struct BufferedExchange {
    method: Method,
    url: String,
    request_headers: HeaderVec,
    cookies: HeaderVec,
    headers_sent: bool,
    /// Staged response status
    pub status: u16,
    /// Staged response headers, in write order
    pub response_headers: HeaderVec,
    /// Staged response body
    pub body: Option<String>,
}

impl BufferedExchange {
    /// Create an exchange for `method url` with no headers and a staged `200`.
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            request_headers: HeaderVec::new(),
            cookies: HeaderVec::new(),
            headers_sent: false,
            status: 200,
            response_headers: HeaderVec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.request_headers.push((Arc::from(name), value.into()));
        self
    }

    #[must_use]
    pub fn with_cookie(mut self, name: &str, value: impl Into<String>) -> Self {
        self.cookies.push((Arc::from(name), value.into()));
        self
    }

    /// Mark the response as already flushed.
    #[must_use]
    pub fn with_headers_sent(mut self, sent: bool) -> Self {
        self.headers_sent = sent;
        self
    }

    /// Stage a response body, as a handler that ran earlier would have.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// First staged response header with the given name (case-insensitive).
    #[must_use]
    pub fn response_header(&self, name: &str) -> Option<&str> {
        self.response_headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// All staged response header values with the given name.
    #[must_use]
    pub fn response_header_values(&self, name: &str) -> Vec<&str> {
        self.response_headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

impl ExchangeView for BufferedExchange {
    fn header_first(&self, name: &str) -> Option<&str> {
        self.request_headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn full_url(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.url)
    }

    fn method(&self) -> &Method {
        &self.method
    }

    fn request_contains_cookies(&self) -> bool {
        !self.cookies.is_empty()
            || self
                .header_first("cookie")
                .is_some_and(|c| !c.trim().is_empty())
    }

    fn is_headers_sent(&self) -> bool {
        self.headers_sent
    }

    fn set_status_code(&mut self, status: u16) {
        self.status = status;
    }

    fn add_header_value(&mut self, name: &str, value: String) {
        self.response_headers.push((Arc::from(name), value));
    }

    fn reset_everything(&mut self) {
        self.status = 200;
        self.response_headers.clear();
        self.body = None;
    }
}
