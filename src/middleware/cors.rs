use std::collections::HashMap;

use tracing::{debug, error, warn};

use super::Middleware;
use crate::cors::{
    build_route_cors_map, ClassificationOutcome, CorsPolicy, CorsPolicyApplier, CorsPolicyOverrides, RouteCorsPolicy,
    StaticResourceCors, ACCESS_CONTROL_REQUEST_METHOD, ORIGIN,
};
use crate::dispatcher::{HandlerRequest, HandlerResponse, PipelineAction};
use crate::exchange::PipelineExchange;

/// CORS (Cross-Origin Resource Sharing) middleware
///
/// Runs the [`CorsPolicyApplier`] in the `before` hook of every request and
/// forwards its [`PipelineAction`]. Invalid origins and preflights
/// short-circuit the dispatcher, so the resource handler never runs for them.
///
/// # Route-specific policies
///
/// Policies are resolved once at construction time:
///
/// - the global policy is the applier defaults with the global overrides on top
/// - a `Custom` route layers its overrides over the global overrides
/// - a `Disabled` route skips CORS entirely (no headers, always `Continue`)
///
/// The per-request cost is a single `HashMap` lookup by handler name.
///
/// # Usage
///
/// ```rust
/// use std::collections::HashMap;
/// use brrtrouter_cors::cors::{CorsPolicyApplier, CorsPolicyOverrides, RouteCorsPolicy};
/// use brrtrouter_cors::middleware::CorsMiddleware;
///
/// let mut routes = HashMap::new();
/// routes.insert("admin_settings".to_string(), RouteCorsPolicy::Disabled);
///
/// let cors = CorsMiddleware::new(
///     CorsPolicyApplier::new(),
///     CorsPolicyOverrides::none().allowed_origins(&["https://app.example.com"]),
/// )
/// .with_route_policies(routes);
/// ```
#[derive(Debug, Clone)]
pub struct CorsMiddleware {
    applier: CorsPolicyApplier,
    overrides: CorsPolicyOverrides,
    global_policy: CorsPolicy,
    /// Resolved per-handler policies; `None` means CORS is disabled for the route
    route_policies: HashMap<String, Option<CorsPolicy>>,
}

impl CorsMiddleware {
    #[must_use]
    pub fn new(applier: CorsPolicyApplier, overrides: CorsPolicyOverrides) -> Self {
        let global_policy = overrides.merge_onto(applier.defaults());
        Self {
            applier,
            overrides,
            global_policy,
            route_policies: HashMap::new(),
        }
    }

    /// Attach per-handler policies, replacing any set before.
    ///
    /// `Inherit` entries are dropped; a handler without an entry uses the
    /// global policy.
    #[must_use]
    pub fn with_route_policies<I, S>(mut self, routes: I) -> Self
    where
        I: IntoIterator<Item = (S, RouteCorsPolicy)>,
        S: Into<String>,
    {
        self.route_policies = build_route_cors_map(routes)
            .into_iter()
            .map(|(handler, policy)| {
                let resolved = match policy {
                    RouteCorsPolicy::Custom(route) => Some(
                        self.overrides
                            .layer(&route)
                            .merge_onto(self.applier.defaults()),
                    ),
                    RouteCorsPolicy::Inherit => Some(self.global_policy.clone()),
                    RouteCorsPolicy::Disabled => None,
                };
                (handler, resolved)
            })
            .collect();
        self
    }

    #[must_use]
    pub fn global_policy(&self) -> &CorsPolicy {
        &self.global_policy
    }

    /// Effective policy for a handler; `None` when CORS is disabled for it.
    #[must_use]
    pub fn policy_for(&self, handler_name: &str) -> Option<&CorsPolicy> {
        match self.route_policies.get(handler_name) {
            Some(route) => route.as_ref(),
            None => Some(&self.global_policy),
        }
    }
}

impl Default for CorsMiddleware {
    fn default() -> Self {
        Self::new(CorsPolicyApplier::new(), CorsPolicyOverrides::none())
    }
}

impl Middleware for CorsMiddleware {
    fn before(&self, req: &HandlerRequest, res: &mut HandlerResponse) -> PipelineAction {
        let Some(policy) = self.policy_for(&req.handler_name) else {
            debug!(
                request_id = %req.request_id,
                handler_name = %req.handler_name,
                "CORS disabled for route"
            );
            return PipelineAction::Continue;
        };

        let mut exchange = PipelineExchange::new(req, res);
        let decision = self.applier.evaluate_policy(&mut exchange, policy);

        if decision.outcome == ClassificationOutcome::HeadersAlreadySent {
            log_headers_already_sent(req);
        }
        decision.action
    }
}

fn log_headers_already_sent(req: &HandlerRequest) {
    let origin = req.get_header(ORIGIN).unwrap_or_default();
    if req.get_header(ACCESS_CONTROL_REQUEST_METHOD).is_some() {
        error!(
            request_id = %req.request_id,
            origin = %origin,
            path = %req.path,
            "Headers already sent, cannot answer CORS preflight"
        );
    } else {
        warn!(
            request_id = %req.request_id,
            origin = %origin,
            path = %req.path,
            "Headers already sent, cannot add CORS headers"
        );
    }
}

/// CORS for static content served below a set of path prefixes
///
/// Requests outside the prefixes pass through untouched. Inside them, the
/// [`StaticResourceCors`] rules apply: only `GET`, `HEAD` and `OPTIONS` with an
/// `Origin` header are evaluated.
#[derive(Debug, Clone)]
pub struct StaticResourceCorsMiddleware {
    cors: StaticResourceCors,
    path_prefixes: Vec<String>,
}

impl StaticResourceCorsMiddleware {
    #[must_use]
    pub fn new(cors: StaticResourceCors, path_prefixes: Vec<String>) -> Self {
        Self {
            cors,
            path_prefixes,
        }
    }

    fn serves(&self, path: &str) -> bool {
        self.path_prefixes.iter().any(|p| path.starts_with(p.as_str()))
    }
}

impl Middleware for StaticResourceCorsMiddleware {
    fn before(&self, req: &HandlerRequest, res: &mut HandlerResponse) -> PipelineAction {
        if !self.serves(&req.path) {
            return PipelineAction::Continue;
        }
        let mut exchange = PipelineExchange::new(req, res);
        match self.cors.handle(&mut exchange) {
            Some(decision) => {
                if decision.outcome == ClassificationOutcome::HeadersAlreadySent {
                    log_headers_already_sent(req);
                }
                decision.action
            }
            None => PipelineAction::Continue,
        }
    }
}
