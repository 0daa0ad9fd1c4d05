//! # BRRTRouter CORS
//!
//! **brrtrouter-cors** is the Cross-Origin Resource Sharing engine of a
//! BRRTRouter-style middleware pipeline. For every request it decides whether
//! CORS applies, whether the origin is authorized, and whether the request is
//! a preflight, then writes the response headers that decision requires.
//!
//! ## Architecture
//!
//! - **[`cors`]** - policy model, request classifier, policy applier, route and
//!   static-resource variants
//! - **[`exchange`]** - the [`ExchangeView`](exchange::ExchangeView) seam the
//!   engine reads and writes through, plus in-memory and pipeline adapters
//! - **[`dispatcher`]** - minimal synchronous pipeline: middleware chain and
//!   named handlers
//! - **[`middleware`]** - `CorsMiddleware`, `StaticResourceCorsMiddleware`,
//!   `TracingMiddleware`
//! - **[`config`]** - YAML configuration file
//! - **[`runtime_config`]** - environment variables read at startup
//! - **[`logging`]** - `tracing-subscriber` initialization
//! - **[`cli`]** - the `brrtrouter-cors` command line
//!
//! ### Request Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant D as Dispatcher
//!     participant M as CorsMiddleware
//!     participant A as CorsPolicyApplier
//!     participant C as CorsRequestClassifier
//!     participant H as Handler
//!
//!     D->>M: before(req, staged response)
//!     M->>A: evaluate_policy(PipelineExchange, route policy)
//!     A->>C: classify(exchange, policy)
//!     C-->>A: NotCors | HeadersAlreadySent | Invalid | Simple | Preflight
//!     A-->>M: Continue | ShortCircuit
//!     alt Continue
//!         D->>H: handler(req, response with CORS headers)
//!     else ShortCircuit
//!         D-->>D: staged response is final
//!     end
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use brrtrouter_cors::cors::{CorsPolicyApplier, CorsPolicyOverrides};
//! use brrtrouter_cors::dispatcher::{Dispatcher, HandlerRequest, HeaderVec};
//! use brrtrouter_cors::middleware::CorsMiddleware;
//! use http::Method;
//! use smallvec::smallvec;
//!
//! let cors = CorsMiddleware::new(
//!     CorsPolicyApplier::new(),
//!     CorsPolicyOverrides::none()
//!         .allowed_origins(&["https://app.example.com"])
//!         .exposed_headers(&["X-Total-Count"]),
//! );
//!
//! let mut dispatcher = Dispatcher::new();
//! dispatcher.add_middleware(Arc::new(cors));
//! dispatcher.register_handler("list_pets", |_req, res| {
//!     res.body = serde_json::json!([{ "name": "fido" }]);
//! });
//!
//! let headers: HeaderVec = smallvec![(Arc::from("Origin"), "https://app.example.com".to_string())];
//! let req = HandlerRequest::new(Method::GET, "https://api.example.com/pets", "list_pets", headers);
//! let res = dispatcher.dispatch(&req);
//!
//! assert_eq!(res.get_header("Access-Control-Allow-Origin"), Some("https://app.example.com"));
//! assert_eq!(res.get_header("Access-Control-Expose-Headers"), Some("X-Total-Count"));
//! ```
//!
//! ## Logging
//!
//! All components log through `tracing`. Binaries call
//! [`logging::init_logging_with_config`]; see [`logging`] for the
//! `BRRTR_LOG_*` variables.

pub mod cli;
pub mod config;
pub mod cors;
pub mod dispatcher;
pub mod exchange;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod runtime_config;
