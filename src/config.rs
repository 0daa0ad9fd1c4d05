//! # Configuration File
//!
//! YAML configuration for the CORS middleware, loaded with `serde_yaml`.
//!
//! ```yaml
//! cors:
//!   strict: false
//!   policy:
//!     allowed_origins: ["https://app.example.com"]
//!     allowed_methods: [GET, POST]
//!     exposed_headers: [X-Total-Count]
//!     allow_credentials: true
//!     max_age_seconds: 3600
//!   routes:
//!     admin_settings: false
//!     upload_file:
//!       allowed_request_headers: [Content-Type, X-Upload-Id]
//!     list_pets: inherit
//!
//! static_resources:
//!   enabled: true
//!   path_prefixes: ["/assets/"]
//!   policy:
//!     allow_credentials: false
//!
//! logging:
//!   log_level: debug
//!   format: pretty
//! ```
//!
//! Every section and key is optional; an empty file yields the component
//! defaults. Policy keys also accept the `camelCase` spelling of OpenAPI
//! `x-cors` extensions (`allowedOrigins`, `maxAge`, ...).

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::cors::{
    validate_policy, CorsPolicy, CorsPolicyApplier, CorsPolicyOverrides, RouteCorsPolicy,
    StaticResourceCors,
};
use crate::logging::LogConfig;
use crate::middleware::{CorsMiddleware, StaticResourceCorsMiddleware};
use crate::runtime_config::RuntimeConfig;

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsFileConfig {
    pub cors: CorsSection,
    pub static_resources: StaticResourcesSection,
    pub logging: Option<LogConfig>,
}

/// `cors` section: the API policy and its per-handler variants
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsSection {
    /// Reject `*` origins combined with credentials
    pub strict: bool,
    /// Overrides merged onto the component defaults
    pub policy: CorsPolicyOverrides,
    /// Handler name → `inherit`, `false`, or an overrides mapping
    pub routes: HashMap<String, RouteCorsPolicy>,
}

/// `static_resources` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticResourcesSection {
    pub enabled: bool,
    /// Request paths starting with any of these are treated as static content
    pub path_prefixes: Vec<String>,
    pub policy: CorsPolicyOverrides,
}

impl CorsFileConfig {
    /// Read, parse and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read, is not valid YAML for this schema,
    /// or describes a policy [`validate`](Self::validate) rejects.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read CORS config {}", path.display()))?;
        let config = Self::from_yaml_str(&raw)
            .with_context(|| format!("Invalid CORS config {}", path.display()))?;
        info!(
            path = %path.display(),
            routes = config.cors.routes.len(),
            static_resources = config.static_resources.enabled,
            "Loaded CORS configuration"
        );
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let config: Self = if raw.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(raw).context("Failed to parse YAML")?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load from `BRRTR_CORS_CONFIG` when set, then apply the remaining
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn from_runtime(runtime: &RuntimeConfig) -> Result<Self> {
        let mut config = match &runtime.config_path {
            Some(path) => Self::load(path)?,
            None => {
                debug!("BRRTR_CORS_CONFIG not set, using default CORS policy");
                Self::default()
            }
        };
        config.apply_runtime(runtime);
        Ok(config)
    }

    /// Apply environment overrides on top of the file contents.
    pub fn apply_runtime(&mut self, runtime: &RuntimeConfig) {
        if let Some(max_age) = runtime.max_age_seconds {
            self.cors.policy.max_age_seconds = Some(max_age);
        }
    }

    /// Check every policy the file can produce: the API policy, each custom
    /// route and the static-resource policy.
    ///
    /// # Errors
    ///
    /// The first [`CorsConfigError`](crate::cors::CorsConfigError), with the
    /// offending section named in the context.
    pub fn validate(&self) -> Result<()> {
        let strict = self.cors.strict;
        validate_policy(&self.default_policy(), strict).context("cors.policy")?;

        let mut routes: Vec<_> = self.cors.routes.iter().collect();
        routes.sort_by(|a, b| a.0.cmp(b.0));
        for (handler, route) in routes {
            if let RouteCorsPolicy::Custom(overrides) = route {
                let policy = self
                    .cors
                    .policy
                    .layer(overrides)
                    .merge_onto(&CorsPolicy::default());
                validate_policy(&policy, strict)
                    .with_context(|| format!("cors.routes.{handler}"))?;
            }
        }

        if self.static_resources.enabled {
            let policy = self.static_resources.policy.merge_onto(&CorsPolicy::default());
            validate_policy(&policy, strict).context("static_resources.policy")?;
        }
        Ok(())
    }

    /// The API policy: `cors.policy` merged onto the component defaults.
    #[must_use]
    pub fn default_policy(&self) -> CorsPolicy {
        self.cors.policy.merge_onto(&CorsPolicy::default())
    }

    /// Middleware for API routes, route policies included.
    #[must_use]
    pub fn cors_middleware(&self) -> CorsMiddleware {
        CorsMiddleware::new(CorsPolicyApplier::new(), self.cors.policy.clone())
            .with_route_policies(self.cors.routes.clone())
    }

    /// Middleware for static content; `None` when the section is disabled.
    #[must_use]
    pub fn static_middleware(&self) -> Option<StaticResourceCorsMiddleware> {
        if !self.static_resources.enabled {
            return None;
        }
        Some(StaticResourceCorsMiddleware::new(
            StaticResourceCors::new(
                CorsPolicyApplier::new(),
                self.static_resources.policy.clone(),
            ),
            self.static_resources.path_prefixes.clone(),
        ))
    }

    /// Logging configuration: the `logging` section with `BRRTR_LOG_*` on top.
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        self.logging.clone().unwrap_or_default().overlay_env()
    }
}
