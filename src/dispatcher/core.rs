//! Dispatcher core module - hot path for request dispatch.
//!
//! # JSF Compliance (Rule 206)
//!
//! Header storage is stack-allocated for the common case. The following clippy
//! lints are denied to keep accidental allocations out of the dispatch loop:
//!
//! - `clippy::inefficient_to_string` - Catches unnecessary allocations
//! - `clippy::format_push_string` - Prevents format! string building
//! - `clippy::unnecessary_to_owned` - Prevents .to_owned() on borrowed data

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use http::Method;
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::ids::RequestId;
use crate::middleware::Middleware;

/// Maximum inline headers/cookies before heap allocation
/// Most requests have ≤16 headers (JSF: no heap in hot path)
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header/cookie storage for the hot path
///
/// Header names use `Arc<str>` so repeated names (`Origin`, `Vary`, the
/// `Access-Control-*` family) clone in O(1).
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Control signal a middleware hands back to the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineAction {
    /// Keep going: run the remaining middleware and the handler.
    Continue,
    /// Skip every remaining `before` hook and the handler; the staged
    /// response is final.
    ShortCircuit,
}

/// Request data passed through the middleware chain to a handler
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// Unique request ID for tracing and correlation
    pub request_id: RequestId,
    /// HTTP method (GET, POST, etc.)
    pub method: Method,
    /// Full request URL (scheme, host, port, path and query)
    pub url: String,
    /// Request path
    pub path: String,
    /// Name of the handler that should process this request
    pub handler_name: String,
    /// HTTP headers (stack-allocated for ≤16 headers)
    pub headers: HeaderVec,
    /// Cookies parsed from the Cookie header (stack-allocated for ≤16 cookies)
    pub cookies: HeaderVec,
}

impl HandlerRequest {
    /// Build a request for `method url` routed to `handler_name`.
    ///
    /// The path is taken from the URL; an unparseable URL is kept verbatim as
    /// the path. Cookies are parsed from any `Cookie` header in `headers`.
    #[must_use]
    pub fn new(method: Method, url: &str, handler_name: &str, headers: HeaderVec) -> Self {
        let path = url::Url::parse(url)
            .map(|u| u.path().to_string())
            .unwrap_or_else(|_| url.to_string());
        let cookies = parse_cookies(&headers);
        Self {
            request_id: RequestId::from_header_or_new(
                headers
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case("x-request-id"))
                    .map(|(_, v)| v.as_str()),
            ),
            method,
            url: url.to_string(),
            path,
            handler_name: handler_name.to_string(),
            headers,
            cookies,
        }
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Whether the `Cookie` header carried at least one named cookie
    #[inline]
    #[must_use]
    pub fn has_cookies(&self) -> bool {
        !self.cookies.is_empty()
    }
}

fn parse_cookies(headers: &HeaderVec) -> HeaderVec {
    let mut cookies = HeaderVec::new();
    for (_, raw) in headers.iter().filter(|(k, _)| k.eq_ignore_ascii_case("cookie")) {
        for pair in raw.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let name = parts.next().unwrap_or_default().trim();
            if name.is_empty() {
                continue;
            }
            let value = parts.next().unwrap_or_default().trim();
            cookies.push((Arc::from(name), value.to_string()));
        }
    }
    cookies
}

/// Response staged by middleware and handlers
#[derive(Debug, Clone, Serialize)]
pub struct HandlerResponse {
    /// HTTP status code (200, 404, 500, etc.)
    pub status: u16,
    /// HTTP response headers (stack-allocated for ≤16 headers)
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    /// Response body as JSON
    pub body: Value,
    /// Set once the transport has flushed the status line and headers
    /// (streaming responses). Nothing can be added to the headers afterwards.
    #[serde(skip_serializing)]
    pub headers_sent: bool,
}

impl Default for HandlerResponse {
    fn default() -> Self {
        Self::new(200, HeaderVec::new(), Value::Null)
    }
}

impl HandlerResponse {
    /// Create a new response with the given status, headers, and body
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
            headers_sent: false,
        }
    }

    /// Get a header by name
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// All values of a header, in write order
    #[must_use]
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Append a header value, keeping any existing values
    pub fn add_header(&mut self, name: &str, value: String) {
        self.headers.push((Arc::from(name), value));
    }

    /// Discard the staged status, headers and body
    pub fn reset(&mut self) {
        self.status = 200;
        self.headers.clear();
        self.body = Value::Null;
    }
}

/// Request handler invoked once the middleware chain lets the request through.
///
/// Handlers write into the staged response so headers added by earlier
/// middleware (CORS, for instance) survive.
pub type Handler = Arc<dyn Fn(&HandlerRequest, &mut HandlerResponse) + Send + Sync>;

/// Dispatcher that runs the middleware chain and the registered handlers
///
/// `before` hooks run in registration order. A hook returning
/// [`PipelineAction::ShortCircuit`] stops the chain: later `before` hooks and the
/// handler are skipped. `after` hooks run in reverse order for every middleware
/// whose `before` hook ran.
#[derive(Clone, Default)]
pub struct Dispatcher {
    /// Map of handler names to handlers
    pub handlers: HashMap<String, Handler>,
    /// Ordered list of middleware to apply to requests/responses
    pub middlewares: Vec<Arc<dyn Middleware>>,
}

impl Dispatcher {
    /// Create a new empty dispatcher
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under `name`, replacing any previous one.
    pub fn register_handler<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(&HandlerRequest, &mut HandlerResponse) + Send + Sync + 'static,
    {
        if self.handlers.insert(name.to_string(), Arc::new(handler)).is_some() {
            warn!(handler_name = %name, "Replaced existing handler");
        }
        info!(
            handler_name = %name,
            total_handlers = self.handlers.len(),
            "Handler registered successfully"
        );
    }

    /// Add middleware to the processing pipeline
    ///
    /// Middleware is executed in the order it's added.
    pub fn add_middleware(&mut self, mw: Arc<dyn Middleware>) {
        self.middlewares.push(mw);
    }

    /// Run one request through the middleware chain and its handler.
    pub fn dispatch(&self, req: &HandlerRequest) -> HandlerResponse {
        let start = Instant::now();
        let mut res = HandlerResponse::default();

        let mut ran = 0;
        let mut action = PipelineAction::Continue;
        for mw in &self.middlewares {
            ran += 1;
            action = mw.before(req, &mut res);
            if action == PipelineAction::ShortCircuit {
                debug!(
                    request_id = %req.request_id,
                    handler_name = %req.handler_name,
                    status = res.status,
                    "Middleware short-circuited the request"
                );
                break;
            }
        }

        if action == PipelineAction::Continue {
            match self.handlers.get(&req.handler_name) {
                Some(handler) => handler(req, &mut res),
                None => {
                    warn!(
                        request_id = %req.request_id,
                        handler_name = %req.handler_name,
                        "No handler registered"
                    );
                    res.status = 404;
                    res.body = serde_json::json!({ "error": "Handler not found" });
                }
            }
        }

        let latency = start.elapsed();
        for mw in self.middlewares[..ran].iter().rev() {
            mw.after(req, &mut res, latency);
        }
        res
    }
}
