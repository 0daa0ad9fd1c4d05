//! # Middleware Module
//!
//! Hooks the [`Dispatcher`](crate::dispatcher::Dispatcher) runs around every handler.
//!
//! - [`CorsMiddleware`] - CORS for API routes, with per-handler policies
//! - [`StaticResourceCorsMiddleware`] - CORS for static content below path prefixes
//! - [`TracingMiddleware`] - request logging with request id, status and latency
//!
//! Custom middleware implements [`Middleware`]; both hooks have no-op defaults.

mod core;
mod cors;
mod tracing;

pub use core::Middleware;
pub use cors::{CorsMiddleware, StaticResourceCorsMiddleware};
pub use tracing::TracingMiddleware;
