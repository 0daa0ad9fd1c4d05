use http::Method;
use tracing::trace;

use super::classifier::ORIGIN;
use super::{CorsDecision, CorsPolicyApplier, CorsPolicyOverrides};
use crate::exchange::ExchangeView;

/// CORS for static files and directories
///
/// Static content is only ever read, so requests other than `GET`, `HEAD` and
/// `OPTIONS` are left alone, as are requests without an `Origin` header. Every
/// other request goes through the regular applier with the configured
/// overrides.
#[derive(Debug, Clone, Default)]
pub struct StaticResourceCors {
    applier: CorsPolicyApplier,
    overrides: CorsPolicyOverrides,
}

impl StaticResourceCors {
    #[must_use]
    pub fn new(applier: CorsPolicyApplier, overrides: CorsPolicyOverrides) -> Self {
        Self { applier, overrides }
    }

    #[must_use]
    pub fn overrides(&self) -> &CorsPolicyOverrides {
        &self.overrides
    }

    /// Run CORS for a static resource request
    ///
    /// Returns `None` when the request is out of scope; the exchange is not
    /// touched in that case.
    pub fn handle<E>(&self, exchange: &mut E) -> Option<CorsDecision>
    where
        E: ExchangeView + ?Sized,
    {
        if exchange.header_first(ORIGIN).is_none() {
            return None;
        }
        if !applies_to_method(exchange.method()) {
            trace!(method = %exchange.method(), "Static resource CORS skipped for method");
            return None;
        }
        Some(self.applier.evaluate(exchange, &self.overrides))
    }
}

fn applies_to_method(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD || *method == Method::OPTIONS
}
