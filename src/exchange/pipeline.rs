use std::borrow::Cow;

use http::Method;

use super::ExchangeView;
use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Per-request adapter exposing a dispatcher request and its staged response
/// as an [`ExchangeView`].
///
/// Borrowed for the duration of one middleware call; it has no state of its own.
pub struct PipelineExchange<'a> {
    req: &'a HandlerRequest,
    res: &'a mut HandlerResponse,
}

impl<'a> PipelineExchange<'a> {
    pub fn new(req: &'a HandlerRequest, res: &'a mut HandlerResponse) -> Self {
        Self { req, res }
    }
}

impl ExchangeView for PipelineExchange<'_> {
    fn header_first(&self, name: &str) -> Option<&str> {
        self.req.get_header(name)
    }

    fn full_url(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.req.url)
    }

    fn method(&self) -> &Method {
        &self.req.method
    }

    fn request_contains_cookies(&self) -> bool {
        self.req.has_cookies()
    }

    fn is_headers_sent(&self) -> bool {
        self.res.headers_sent
    }

    fn set_status_code(&mut self, status: u16) {
        self.res.status = status;
    }

    fn add_header_value(&mut self, name: &str, value: String) {
        self.res.add_header(name, value);
    }

    fn reset_everything(&mut self) {
        self.res.reset();
    }
}
