use std::time::Duration;

use tracing::{debug, info};

use super::Middleware;
use crate::dispatcher::{HandlerRequest, HandlerResponse, PipelineAction};

/// Logs request entry and completion with the request id, status and latency.
///
/// Register it first so its `after` hook runs last and sees the final status,
/// including responses staged by a short-circuiting CORS middleware.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn before(&self, req: &HandlerRequest, _res: &mut HandlerResponse) -> PipelineAction {
        debug!(
            request_id = %req.request_id,
            method = %req.method,
            path = %req.path,
            handler = %req.handler_name,
            "Request received"
        );
        PipelineAction::Continue
    }

    fn after(&self, req: &HandlerRequest, res: &mut HandlerResponse, latency: Duration) {
        info!(
            request_id = %req.request_id,
            method = %req.method,
            path = %req.path,
            handler = %req.handler_name,
            status = res.status,
            latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
            "Request completed"
        );
    }
}
