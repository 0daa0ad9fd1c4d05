//! # Dispatcher Module
//!
//! The dispatcher is the host pipeline the CORS engine plugs into. It owns the
//! ordered middleware chain and the named request handlers.
//!
//! ## Request Flow
//!
//! 1. A [`HandlerRequest`] arrives with the name of the handler that should run
//! 2. Each middleware's `before` hook runs in order against the staged
//!    [`HandlerResponse`]
//! 3. A hook returning [`PipelineAction::ShortCircuit`] ends the chain; the
//!    handler is skipped and the staged response is final
//! 4. Otherwise the handler runs and writes into the staged response
//! 5. `after` hooks run in reverse order for every middleware that ran
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use brrtrouter_cors::dispatcher::{Dispatcher, HandlerRequest, HeaderVec};
//! use brrtrouter_cors::middleware::CorsMiddleware;
//! use http::Method;
//!
//! let mut dispatcher = Dispatcher::new();
//! dispatcher.add_middleware(Arc::new(CorsMiddleware::default()));
//! dispatcher.register_handler("list_pets", |_req, res| {
//!     res.body = serde_json::json!(["fido"]);
//! });
//!
//! let req = HandlerRequest::new(Method::GET, "http://api.local/pets", "list_pets", HeaderVec::new());
//! let res = dispatcher.dispatch(&req);
//! assert_eq!(res.status, 200);
//! ```

mod core;

pub use core::{
    Dispatcher, Handler, HandlerRequest, HandlerResponse, HeaderVec, PipelineAction,
    MAX_INLINE_HEADERS,
};
