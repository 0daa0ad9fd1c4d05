use std::time::Duration;

use crate::dispatcher::{HandlerRequest, HandlerResponse, PipelineAction};

/// Hook pair run by the [`Dispatcher`](crate::dispatcher::Dispatcher) around every handler.
///
/// `before` works on the staged response; returning
/// [`PipelineAction::ShortCircuit`] makes that response final.
pub trait Middleware: Send + Sync {
    fn before(&self, _req: &HandlerRequest, _res: &mut HandlerResponse) -> PipelineAction {
        PipelineAction::Continue
    }
    fn after(&self, _req: &HandlerRequest, _res: &mut HandlerResponse, _latency: Duration) {}
}
