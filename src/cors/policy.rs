use http::Method;
use serde::{Deserialize, Deserializer};

use super::CorsConfigError;

/// Wildcard value accepted in `allowed_origins` and `allowed_request_headers`
pub const WILDCARD: &str = "*";

/// Default preflight cache duration: 24 hours
pub const DEFAULT_MAX_AGE_SECONDS: i64 = 86_400;

/// Every method `http::Method` names as a constant
#[must_use]
pub fn all_known_methods() -> Vec<Method> {
    vec![
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::HEAD,
        Method::OPTIONS,
        Method::CONNECT,
        Method::PATCH,
        Method::TRACE,
    ]
}

/// Parse a method name from configuration (case-insensitive, surrounding
/// whitespace ignored).
pub fn parse_method(raw: &str) -> Result<Method, CorsConfigError> {
    let upper = raw.trim().to_ascii_uppercase();
    if upper.is_empty() {
        return Err(CorsConfigError::InvalidMethod {
            method: raw.to_string(),
        });
    }
    Method::from_bytes(upper.as_bytes()).map_err(|_| CorsConfigError::InvalidMethod {
        method: raw.to_string(),
    })
}

/// Immutable CORS configuration for one filter invocation
///
/// Constructed through [`CorsPolicy::new`], [`CorsPolicyBuilder`](super::CorsPolicyBuilder)
/// or [`CorsPolicyOverrides::merge_onto`]. Construction normalizes every list:
///
/// - entries are trimmed and empty entries dropped
/// - duplicates are removed (case-insensitively), keeping the first spelling
/// - `OPTIONS` is appended to `allowed_methods` if missing, since a preflight
///   always uses it
///
/// List order is preserved, so joined header values are deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsPolicy {
    allowed_origins: Vec<String>,
    exposed_headers: Vec<String>,
    allowed_request_headers: Vec<String>,
    allow_credentials: bool,
    allowed_methods: Vec<Method>,
    max_age_seconds: i64,
}

impl CorsPolicy {
    /// Create a policy from explicit values
    ///
    /// # Arguments
    ///
    /// * `allowed_origins` - exact origins, or `"*"` for any origin
    /// * `exposed_headers` - response headers scripts may read beyond the safelisted set
    /// * `allowed_request_headers` - headers a preflight may ask to send, or `"*"`
    /// * `allow_credentials` - emit `Access-Control-Allow-Credentials: true`
    /// * `allowed_methods` - methods advertised on preflight (`OPTIONS` is added)
    /// * `max_age_seconds` - preflight cache duration; `<= 0` omits the header
    #[must_use]
    pub fn new(
        allowed_origins: Vec<String>,
        exposed_headers: Vec<String>,
        allowed_request_headers: Vec<String>,
        allow_credentials: bool,
        allowed_methods: Vec<Method>,
        max_age_seconds: i64,
    ) -> Self {
        let mut methods: Vec<Method> = Vec::with_capacity(allowed_methods.len() + 1);
        for m in allowed_methods {
            if !methods.contains(&m) {
                methods.push(m);
            }
        }
        if !methods.contains(&Method::OPTIONS) {
            methods.push(Method::OPTIONS);
        }

        Self {
            allowed_origins: normalize_list(allowed_origins),
            exposed_headers: normalize_list(exposed_headers),
            allowed_request_headers: normalize_list(allowed_request_headers),
            allow_credentials,
            allowed_methods: methods,
            max_age_seconds,
        }
    }

    #[must_use]
    pub fn allowed_origins(&self) -> &[String] {
        &self.allowed_origins
    }

    #[must_use]
    pub fn exposed_headers(&self) -> &[String] {
        &self.exposed_headers
    }

    #[must_use]
    pub fn allowed_request_headers(&self) -> &[String] {
        &self.allowed_request_headers
    }

    #[must_use]
    pub fn allow_credentials(&self) -> bool {
        self.allow_credentials
    }

    /// Allowed methods; always contains `OPTIONS`
    #[must_use]
    pub fn allowed_methods(&self) -> &[Method] {
        &self.allowed_methods
    }

    #[must_use]
    pub fn max_age_seconds(&self) -> i64 {
        self.max_age_seconds
    }

    #[must_use]
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == WILDCARD)
    }

    #[must_use]
    pub fn allows_any_request_header(&self) -> bool {
        self.allowed_request_headers.iter().any(|h| h == WILDCARD)
    }

    /// Whether `origin` is authorized: wildcard, or an ASCII case-insensitive
    /// match against one of the configured origins.
    #[must_use]
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        if self.allows_any_origin() {
            return true;
        }
        let origin = origin.trim();
        self.allowed_origins
            .iter()
            .any(|o| o.eq_ignore_ascii_case(origin))
    }

    /// Whether a single requested header name may be sent
    #[must_use]
    pub fn is_request_header_allowed(&self, header: &str) -> bool {
        self.allows_any_request_header()
            || self
                .allowed_request_headers
                .iter()
                .any(|h| h.eq_ignore_ascii_case(header.trim()))
    }

    /// Value for `Access-Control-Allow-Origin` given an authorized `origin`
    ///
    /// With credentials allowed, the literal origin is always echoed: browsers
    /// reject `*` on credentialed responses. Without credentials a wildcard
    /// policy answers `*`.
    #[must_use]
    pub fn allow_origin_value(&self, origin: &str) -> String {
        if !self.allow_credentials && self.allows_any_origin() {
            WILDCARD.to_string()
        } else {
            origin.to_string()
        }
    }
}

/// Component defaults: any origin, no extra exposed headers, any request
/// header, credentials allowed, every known method, 24h preflight cache.
impl Default for CorsPolicy {
    fn default() -> Self {
        Self::new(
            vec![WILDCARD.to_string()],
            vec![],
            vec![WILDCARD.to_string()],
            true,
            all_known_methods(),
            DEFAULT_MAX_AGE_SECONDS,
        )
    }
}

fn normalize_list(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for v in values {
        let v = v.trim();
        if v.is_empty() || out.iter().any(|o| o.eq_ignore_ascii_case(v)) {
            continue;
        }
        out.push(v.to_string());
    }
    out
}

/// Partial policy supplied by a caller; `None` fields fall back to defaults
///
/// Deserializes from configuration files. Keys accept both `snake_case` and the
/// `camelCase` spelling used by OpenAPI `x-cors` extensions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsPolicyOverrides {
    #[serde(alias = "allowedOrigins")]
    pub allowed_origins: Option<Vec<String>>,
    #[serde(alias = "exposedHeaders", alias = "exposeHeaders", alias = "expose_headers")]
    pub exposed_headers: Option<Vec<String>>,
    #[serde(alias = "allowedRequestHeaders", alias = "allowedHeaders", alias = "allowed_headers")]
    pub allowed_request_headers: Option<Vec<String>>,
    #[serde(alias = "allowCredentials")]
    pub allow_credentials: Option<bool>,
    #[serde(alias = "allowedMethods", deserialize_with = "deserialize_methods")]
    pub allowed_methods: Option<Vec<Method>>,
    #[serde(alias = "maxAgeSeconds", alias = "maxAge", alias = "max_age")]
    pub max_age_seconds: Option<i64>,
}

impl CorsPolicyOverrides {
    /// No overrides: every field comes from the defaults
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn allowed_origins<S: AsRef<str>>(mut self, origins: &[S]) -> Self {
        self.allowed_origins = Some(origins.iter().map(|s| s.as_ref().to_string()).collect());
        self
    }

    #[must_use]
    pub fn exposed_headers<S: AsRef<str>>(mut self, headers: &[S]) -> Self {
        self.exposed_headers = Some(headers.iter().map(|s| s.as_ref().to_string()).collect());
        self
    }

    #[must_use]
    pub fn allowed_request_headers<S: AsRef<str>>(mut self, headers: &[S]) -> Self {
        self.allowed_request_headers =
            Some(headers.iter().map(|s| s.as_ref().to_string()).collect());
        self
    }

    #[must_use]
    pub fn allow_credentials(mut self, allow: bool) -> Self {
        self.allow_credentials = Some(allow);
        self
    }

    #[must_use]
    pub fn allowed_methods(mut self, methods: &[Method]) -> Self {
        self.allowed_methods = Some(methods.to_vec());
        self
    }

    #[must_use]
    pub fn max_age_seconds(mut self, seconds: i64) -> Self {
        self.max_age_seconds = Some(seconds);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Stack `top` over `self`: every field set in `top` wins.
    #[must_use]
    pub fn layer(&self, top: &CorsPolicyOverrides) -> CorsPolicyOverrides {
        CorsPolicyOverrides {
            allowed_origins: top
                .allowed_origins
                .clone()
                .or_else(|| self.allowed_origins.clone()),
            exposed_headers: top
                .exposed_headers
                .clone()
                .or_else(|| self.exposed_headers.clone()),
            allowed_request_headers: top
                .allowed_request_headers
                .clone()
                .or_else(|| self.allowed_request_headers.clone()),
            allow_credentials: top.allow_credentials.or(self.allow_credentials),
            allowed_methods: top
                .allowed_methods
                .clone()
                .or_else(|| self.allowed_methods.clone()),
            max_age_seconds: top.max_age_seconds.or(self.max_age_seconds),
        }
    }

    /// Resolve into a full policy, taking unset fields from `defaults`.
    #[must_use]
    pub fn merge_onto(&self, defaults: &CorsPolicy) -> CorsPolicy {
        CorsPolicy::new(
            self.allowed_origins
                .clone()
                .unwrap_or_else(|| defaults.allowed_origins.clone()),
            self.exposed_headers
                .clone()
                .unwrap_or_else(|| defaults.exposed_headers.clone()),
            self.allowed_request_headers
                .clone()
                .unwrap_or_else(|| defaults.allowed_request_headers.clone()),
            self.allow_credentials.unwrap_or(defaults.allow_credentials),
            self.allowed_methods
                .clone()
                .unwrap_or_else(|| defaults.allowed_methods.clone()),
            self.max_age_seconds.unwrap_or(defaults.max_age_seconds),
        )
    }
}

fn deserialize_methods<'de, D>(deserializer: D) -> Result<Option<Vec<Method>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<String>> = Option::deserialize(deserializer)?;
    raw.map(|names| {
        names
            .iter()
            .map(|n| parse_method(n).map_err(serde::de::Error::custom))
            .collect::<Result<Vec<_>, _>>()
    })
    .transpose()
}
