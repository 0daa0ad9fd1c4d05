//! # CORS Module
//!
//! Cross-Origin Resource Sharing decision engine. Given one request/response
//! exchange and a policy, it decides whether the request is CORS at all,
//! whether its origin is authorized, and whether it is a preflight, then writes
//! the response headers that outcome calls for.
//!
//! ## Components
//!
//! - [`CorsPolicy`] - immutable, normalized configuration for one invocation
//! - [`CorsPolicyOverrides`] - partial policy merged onto the defaults
//! - [`CorsPolicyBuilder`] - validated construction with an optional strict mode
//! - [`CorsRequestClassifier`] - classification and header writing
//! - [`CorsPolicyApplier`] - merges overrides, classifies, and maps the outcome
//!   to a [`PipelineAction`](crate::dispatcher::PipelineAction)
//! - [`RouteCorsPolicy`] - per-handler `Inherit` / `Disabled` / `Custom` policy
//! - [`StaticResourceCors`] - the same engine restricted to static content
//!
//! ## Outcomes
//!
//! | Outcome              | Headers written                                  | Pipeline       |
//! |----------------------|--------------------------------------------------|----------------|
//! | `HeadersAlreadySent` | none                                             | `Continue`     |
//! | `NotCors`            | none                                             | `Continue`     |
//! | `Invalid`            | none                                             | `ShortCircuit` |
//! | `Simple`             | Allow-Origin, Vary, Allow-Credentials, Expose    | `Continue`     |
//! | `Preflight`          | Allow-Origin, Vary, Allow-Credentials, Methods, Headers, Max-Age; status 200 | `ShortCircuit` |
//!
//! ## Example
//!
//! ```rust
//! use brrtrouter_cors::cors::{ClassificationOutcome, CorsPolicyApplier, CorsPolicyOverrides};
//! use brrtrouter_cors::dispatcher::PipelineAction;
//! use brrtrouter_cors::exchange::BufferedExchange;
//! use http::Method;
//!
//! let applier = CorsPolicyApplier::new();
//! let overrides = CorsPolicyOverrides::none().allowed_origins(&["http://app.local"]);
//!
//! let mut exchange = BufferedExchange::new(Method::OPTIONS, "http://api.local/pets")
//!     .with_header("Origin", "http://app.local")
//!     .with_header("Access-Control-Request-Method", "POST");
//!
//! let decision = applier.evaluate(&mut exchange, &overrides);
//! assert_eq!(decision.outcome, ClassificationOutcome::Preflight);
//! assert_eq!(decision.action, PipelineAction::ShortCircuit);
//! assert_eq!(exchange.response_header("Access-Control-Max-Age"), Some("86400"));
//! ```

mod applier;
mod builder;
mod classifier;
mod error;
mod policy;
mod route_config;
mod static_resources;

pub use applier::{action_for, CorsDecision, CorsPolicyApplier};
pub use builder::{validate_origins, validate_policy, CorsPolicyBuilder};
pub use classifier::{
    is_preflight_request, is_same_origin, ClassificationOutcome, CorsRequestClassifier,
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS, ACCESS_CONTROL_MAX_AGE,
    ACCESS_CONTROL_REQUEST_HEADERS, ACCESS_CONTROL_REQUEST_METHOD, ORIGIN, VARY,
};
pub use error::CorsConfigError;
pub use policy::{
    all_known_methods, parse_method, CorsPolicy, CorsPolicyOverrides, DEFAULT_MAX_AGE_SECONDS,
    WILDCARD,
};
pub use route_config::{build_route_cors_map, RouteCorsPolicy};
pub use static_resources::StaticResourceCors;
