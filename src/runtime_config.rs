//! # Runtime Configuration Module
//!
//! Environment variables read at startup by the `brrtrouter-cors` binary and by
//! services embedding the middleware.
//!
//! ## Environment Variables
//!
//! ### `BRRTR_CORS_CONFIG`
//!
//! Path of the YAML configuration file (see [`crate::config`]). Used when no
//! `--config` flag is given.
//!
//! ### `BRRTR_CORS_MAX_AGE`
//!
//! Preflight cache duration in seconds. Overrides `max_age_seconds` of the
//! default policy. `0` or a negative value disables `Access-Control-Max-Age`.
//! Values that do not parse as an integer are ignored.
//!
//! ## Usage
//!
//! ```rust
//! use brrtrouter_cors::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! if let Some(path) = &config.config_path {
//!     println!("CORS config: {}", path.display());
//! }
//! ```

use std::env;
use std::path::PathBuf;

use tracing::warn;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Configuration file path from `BRRTR_CORS_CONFIG`
    pub config_path: Option<PathBuf>,
    /// Max-age override from `BRRTR_CORS_MAX_AGE`
    pub max_age_seconds: Option<i64>,
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_values(
            env::var("BRRTR_CORS_CONFIG").ok().as_deref(),
            env::var("BRRTR_CORS_MAX_AGE").ok().as_deref(),
        )
    }

    fn from_values(config_path: Option<&str>, max_age: Option<&str>) -> Self {
        let max_age_seconds = max_age.and_then(|raw| match raw.trim().parse::<i64>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(value = %raw, "Ignoring BRRTR_CORS_MAX_AGE, not an integer");
                None
            }
        });
        RuntimeConfig {
            config_path: config_path
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            max_age_seconds,
        }
    }
}
