use http::Method;
use serde::Serialize;
use tracing::{debug, info};
use url::Url;

use super::policy::{parse_method, CorsPolicy, WILDCARD};
use crate::exchange::ExchangeView;

pub const ORIGIN: &str = "Origin";
pub const VARY: &str = "Vary";
pub const ACCESS_CONTROL_REQUEST_METHOD: &str = "Access-Control-Request-Method";
pub const ACCESS_CONTROL_REQUEST_HEADERS: &str = "Access-Control-Request-Headers";
pub const ACCESS_CONTROL_ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";
pub const ACCESS_CONTROL_ALLOW_CREDENTIALS: &str = "Access-Control-Allow-Credentials";
pub const ACCESS_CONTROL_EXPOSE_HEADERS: &str = "Access-Control-Expose-Headers";
pub const ACCESS_CONTROL_ALLOW_METHODS: &str = "Access-Control-Allow-Methods";
pub const ACCESS_CONTROL_ALLOW_HEADERS: &str = "Access-Control-Allow-Headers";
pub const ACCESS_CONTROL_MAX_AGE: &str = "Access-Control-Max-Age";

/// Result of classifying one exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationOutcome {
    /// No `Origin` header, or the request is same-origin
    NotCors,
    /// The response was already flushed; nothing can be added
    HeadersAlreadySent,
    /// `Origin` present but not authorized by the policy
    Invalid,
    /// Authorized cross-origin request that is not a preflight; headers written
    Simple,
    /// Authorized `OPTIONS` preflight; headers and status 200 written
    Preflight,
}

/// Classifies a request as not-CORS, invalid, simple or preflight and writes
/// the response headers the outcome requires.
///
/// Headers are written only for [`ClassificationOutcome::Simple`] and
/// [`ClassificationOutcome::Preflight`]. The headers-sent flag is read before
/// anything else, so a call never mutates an already-flushed response.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorsRequestClassifier;

impl CorsRequestClassifier {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    pub fn classify<E>(&self, exchange: &mut E, policy: &CorsPolicy) -> ClassificationOutcome
    where
        E: ExchangeView + ?Sized,
    {
        if exchange.is_headers_sent() {
            return ClassificationOutcome::HeadersAlreadySent;
        }

        let origin = match exchange.header_first(ORIGIN).map(str::trim) {
            Some(o) if !o.is_empty() => o.to_string(),
            _ => return ClassificationOutcome::NotCors,
        };

        if is_same_origin(&exchange.full_url(), &origin) {
            debug!(origin = %origin, "CORS: same-origin request, skipping CORS headers");
            return ClassificationOutcome::NotCors;
        }

        if !policy.is_origin_allowed(&origin) {
            return ClassificationOutcome::Invalid;
        }

        if exchange.request_contains_cookies() && !policy.allow_credentials() {
            debug!(
                origin = %origin,
                "CORS: request carries cookies but credentials are not allowed; \
                 the browser will withhold the response from credentialed callers"
            );
        }

        if is_preflight_request(exchange) {
            log_preflight_mismatches(exchange, policy);
            exchange.reset_everything();
            write_origin_and_credentials(exchange, policy, &origin);
            write_allow_methods(exchange, policy);
            write_allow_headers(exchange, policy);
            if policy.max_age_seconds() > 0 {
                exchange.add_header_value(
                    ACCESS_CONTROL_MAX_AGE,
                    policy.max_age_seconds().to_string(),
                );
            }
            exchange.set_status_code(200);
            ClassificationOutcome::Preflight
        } else {
            write_origin_and_credentials(exchange, policy, &origin);
            if !policy.exposed_headers().is_empty() {
                exchange.add_header_value(
                    ACCESS_CONTROL_EXPOSE_HEADERS,
                    policy.exposed_headers().join(", "),
                );
            }
            ClassificationOutcome::Simple
        }
    }
}

/// `OPTIONS` carrying an `Access-Control-Request-Method` header
pub fn is_preflight_request<E>(exchange: &E) -> bool
where
    E: ExchangeView + ?Sized,
{
    exchange.method() == Method::OPTIONS
        && exchange.header_first(ACCESS_CONTROL_REQUEST_METHOD).is_some()
}

/// Compare the scheme/host/port of the request URL with the `Origin` value.
///
/// Default ports are normalized (`http://a.com` equals `http://a.com:80`).
/// Anything that does not parse to a tuple origin is treated as cross-origin.
pub fn is_same_origin(full_url: &str, origin: &str) -> bool {
    let (Ok(request_url), Ok(origin_url)) = (Url::parse(full_url), Url::parse(origin)) else {
        return false;
    };
    let request_origin = request_url.origin();
    request_origin.is_tuple() && request_origin == origin_url.origin()
}

fn write_origin_and_credentials<E>(exchange: &mut E, policy: &CorsPolicy, origin: &str)
where
    E: ExchangeView + ?Sized,
{
    let allow_origin = policy.allow_origin_value(origin);
    let echoes_origin = allow_origin != WILDCARD;
    exchange.add_header_value(ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
    // The response now depends on the request's Origin
    if echoes_origin {
        exchange.add_header_value(VARY, ORIGIN.to_string());
    }
    if policy.allow_credentials() {
        exchange.add_header_value(ACCESS_CONTROL_ALLOW_CREDENTIALS, "true".to_string());
    }
}

fn write_allow_methods<E>(exchange: &mut E, policy: &CorsPolicy)
where
    E: ExchangeView + ?Sized,
{
    let methods = policy
        .allowed_methods()
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    exchange.add_header_value(ACCESS_CONTROL_ALLOW_METHODS, methods);
}

fn write_allow_headers<E>(exchange: &mut E, policy: &CorsPolicy)
where
    E: ExchangeView + ?Sized,
{
    let value = if policy.allows_any_request_header() {
        exchange
            .header_first(ACCESS_CONTROL_REQUEST_HEADERS)
            .filter(|h| !h.trim().is_empty())
            .map(str::to_string)
    } else if policy.allowed_request_headers().is_empty() {
        None
    } else {
        Some(policy.allowed_request_headers().join(", "))
    };
    if let Some(value) = value {
        exchange.add_header_value(ACCESS_CONTROL_ALLOW_HEADERS, value);
    }
}

/// Log requested methods/headers the policy will not advertise. The browser
/// enforces the Allow-* lists; this only explains the failure it will report.
fn log_preflight_mismatches<E>(exchange: &E, policy: &CorsPolicy)
where
    E: ExchangeView + ?Sized,
{
    if let Some(requested) = exchange.header_first(ACCESS_CONTROL_REQUEST_METHOD) {
        let disallowed = requested
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .any(|m| match parse_method(m) {
                Ok(method) => !policy.allowed_methods().contains(&method),
                Err(_) => true,
            });
        if disallowed {
            info!(
                requested_method = %requested,
                "CORS preflight: requested method is not allowed"
            );
        }
    }

    if let Some(requested) = exchange.header_first(ACCESS_CONTROL_REQUEST_HEADERS) {
        if let Some(header) = requested
            .split(',')
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .find(|h| !policy.is_request_header_allowed(h))
        {
            info!(
                requested_headers = %requested,
                header = %header,
                "CORS preflight: requested header is not allowed"
            );
        }
    }
}
