use http::Method;

use super::policy::{all_known_methods, DEFAULT_MAX_AGE_SECONDS, WILDCARD};
use super::{CorsConfigError, CorsPolicy};

/// Builder for creating a [`CorsPolicy`] with a fluent API
///
/// Starts from the component defaults (any origin, any request header,
/// credentials allowed, every known method, 24h max-age) and validates the
/// result in [`build()`](Self::build).
///
/// # Example
///
/// ```rust
/// use brrtrouter_cors::cors::CorsPolicyBuilder;
/// use http::Method;
///
/// let policy = CorsPolicyBuilder::new()
///     .allowed_origins(&["https://example.com", "https://api.example.com"])
///     .allowed_methods(&[Method::GET, Method::POST, Method::PUT])
///     .allowed_request_headers(&["Content-Type", "Authorization"])
///     .allow_credentials(true)
///     .exposed_headers(&["X-Total-Count"])
///     .max_age(3600)
///     .build()
///     .expect("Invalid CORS configuration");
///
/// assert!(policy.is_origin_allowed("https://api.example.com"));
/// ```
#[derive(Debug, Clone)]
pub struct CorsPolicyBuilder {
    allowed_origins: Vec<String>,
    exposed_headers: Vec<String>,
    allowed_request_headers: Vec<String>,
    allow_credentials: bool,
    allowed_methods: Vec<Method>,
    max_age_seconds: i64,
    strict: bool,
}

impl CorsPolicyBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            allowed_origins: vec![WILDCARD.to_string()],
            exposed_headers: vec![],
            allowed_request_headers: vec![WILDCARD.to_string()],
            allow_credentials: true,
            allowed_methods: all_known_methods(),
            max_age_seconds: DEFAULT_MAX_AGE_SECONDS,
            strict: false,
        }
    }

    /// Set allowed origins
    ///
    /// Use `&["*"]` to allow all origins. Each non-wildcard origin must have the
    /// form `scheme://host[:port]`; `build()` rejects anything else.
    #[must_use]
    pub fn allowed_origins(mut self, origins: &[&str]) -> Self {
        self.allowed_origins = origins.iter().map(|s| s.to_string()).collect();
        self
    }

    #[must_use]
    pub fn allowed_methods(mut self, methods: &[Method]) -> Self {
        self.allowed_methods = methods.to_vec();
        self
    }

    /// Headers a preflight may ask to send; `&["*"]` reflects whatever the
    /// browser asks for.
    #[must_use]
    pub fn allowed_request_headers(mut self, headers: &[&str]) -> Self {
        self.allowed_request_headers = headers.iter().map(|s| s.to_string()).collect();
        self
    }

    #[must_use]
    pub fn allow_credentials(mut self, allow: bool) -> Self {
        self.allow_credentials = allow;
        self
    }

    /// Headers to expose to JavaScript beyond the CORS-safelisted set
    #[must_use]
    pub fn exposed_headers(mut self, headers: &[&str]) -> Self {
        self.exposed_headers = headers.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Preflight cache duration in seconds; `<= 0` disables the header
    #[must_use]
    pub fn max_age(mut self, seconds: i64) -> Self {
        self.max_age_seconds = seconds;
        self
    }

    /// Reject wildcard origin combined with credentials instead of echoing the
    /// request origin.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Build the policy
    ///
    /// # Errors
    ///
    /// - [`CorsConfigError::EmptyOrigins`] if no origin is configured
    /// - [`CorsConfigError::InvalidOriginFormat`] for an origin that is not `*`
    ///   and not `scheme://host[:port]`
    /// - [`CorsConfigError::WildcardWithCredentials`] in strict mode when `*`
    ///   and credentials are combined
    pub fn build(self) -> Result<CorsPolicy, CorsConfigError> {
        let policy = CorsPolicy::new(
            self.allowed_origins,
            self.exposed_headers,
            self.allowed_request_headers,
            self.allow_credentials,
            self.allowed_methods,
            self.max_age_seconds,
        );
        validate_policy(&policy, self.strict)?;
        Ok(policy)
    }
}

impl Default for CorsPolicyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate an already constructed policy, e.g. one merged from a
/// configuration file.
///
/// # Errors
///
/// Same as [`CorsPolicyBuilder::build`].
pub fn validate_policy(policy: &CorsPolicy, strict: bool) -> Result<(), CorsConfigError> {
    validate_origins(policy.allowed_origins())?;
    if strict && policy.allow_credentials() && policy.allows_any_origin() {
        return Err(CorsConfigError::WildcardWithCredentials);
    }
    Ok(())
}

/// Check every configured origin is `*` or a bare `scheme://host[:port]`.
pub fn validate_origins(origins: &[String]) -> Result<(), CorsConfigError> {
    if origins.iter().all(|o| o.trim().is_empty()) {
        return Err(CorsConfigError::EmptyOrigins);
    }
    for origin in origins {
        let origin = origin.trim();
        if origin.is_empty() || origin == WILDCARD {
            continue;
        }
        if !is_serialized_origin(origin) {
            return Err(CorsConfigError::InvalidOriginFormat {
                origin: origin.to_string(),
            });
        }
    }
    Ok(())
}

fn is_serialized_origin(origin: &str) -> bool {
    let Ok(parsed) = url::Url::parse(origin) else {
        return false;
    };
    if !parsed.has_host() {
        return false;
    }
    // An origin carries no path, query or fragment
    let rest = origin
        .split_once("://")
        .map(|(_, r)| r)
        .unwrap_or_default();
    !rest.contains('/') && !rest.contains('?') && !rest.contains('#')
}
