//! # Exchange Module
//!
//! The exchange module defines the narrow view the CORS engine has of one
//! request/response pair.
//!
//! ## Overview
//!
//! The classifier never touches a concrete HTTP stack. Everything it reads or
//! writes goes through [`ExchangeView`]:
//!
//! - read the first value of a request header (case-insensitive)
//! - read the full request URL
//! - read the request method
//! - ask whether the request carries cookies
//! - ask whether the response headers were already flushed
//! - set the status code, append a response header, reset the staged response
//!
//! Two implementations ship with the crate:
//!
//! - [`BufferedExchange`] - a self-contained, in-memory exchange used by the CLI
//!   and by tests
//! - [`PipelineExchange`] - a per-request adapter over the dispatcher's
//!   [`HandlerRequest`](crate::dispatcher::HandlerRequest) and
//!   [`HandlerResponse`](crate::dispatcher::HandlerResponse)
//!
//! ## Usage
//!
//! ```rust
//! use brrtrouter_cors::exchange::{BufferedExchange, ExchangeView};
//! use http::Method;
//!
//! let mut exchange = BufferedExchange::new(Method::GET, "http://api.example.com/pets")
//!     .with_header("Origin", "http://app.example.com");
//!
//! assert_eq!(exchange.header_first("origin"), Some("http://app.example.com"));
//! exchange.add_header_value("Vary", "Origin".to_string());
//! assert_eq!(exchange.response_header("vary"), Some("Origin"));
//! ```

mod core;
mod pipeline;

pub use core::{BufferedExchange, ExchangeView};
pub use pipeline::PipelineExchange;
