//! # CLI Module
//!
//! Command-line front end for the CORS engine, shipped as the
//! `brrtrouter-cors` binary.
//!
//! ## Commands
//!
//! ### `check`
//!
//! Describe a request on the command line and print the decision as JSON:
//!
//! ```bash
//! brrtrouter-cors check \
//!     --config cors.yaml \
//!     --url https://api.example.com/pets \
//!     --method OPTIONS \
//!     --origin https://app.example.com \
//!     --header 'Access-Control-Request-Method: POST' \
//!     --header 'Access-Control-Request-Headers: Content-Type'
//! ```
//!
//! ```json
//! {
//!   "outcome": "preflight",
//!   "action": "short_circuit",
//!   "cors_enabled": true,
//!   "status": 200,
//!   "headers": [
//!     { "name": "Access-Control-Allow-Origin", "value": "https://app.example.com" },
//!     { "name": "Vary", "value": "Origin" },
//!     ...
//!   ]
//! }
//! ```
//!
//! Options:
//! - `--config <FILE>` - YAML configuration (falls back to `BRRTR_CORS_CONFIG`, then defaults)
//! - `--route <HANDLER>` - evaluate with that handler's route policy
//! - `--cookie` - the request carries cookies
//! - `--headers-sent` - simulate an already flushed response
//!
//! ### `validate`
//!
//! ```bash
//! brrtrouter-cors validate --config cors.yaml
//! ```
//!
//! Exits non-zero with the offending section when the file is invalid.

mod commands;


pub use commands::{check, parse_header_arg, run_cli, run_command, CheckReport, Cli, Commands, HeaderLine};
