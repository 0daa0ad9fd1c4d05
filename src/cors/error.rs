use std::fmt;

/// CORS configuration error
///
/// Returned by [`CorsPolicyBuilder::build()`](super::CorsPolicyBuilder::build) and by
/// configuration loading when a policy cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsConfigError {
    /// Wildcard origin (`*`) combined with credentials in strict mode
    ///
    /// Browsers reject `Access-Control-Allow-Origin: *` on credentialed requests.
    /// The classifier sidesteps this by echoing the request origin; strict mode
    /// refuses the combination instead.
    WildcardWithCredentials,
    /// Invalid origin format
    ///
    /// The origin string does not match the expected format (scheme://host:port).
    InvalidOriginFormat {
        /// The invalid origin string
        origin: String,
    },
    /// An HTTP method name that is not a valid token
    InvalidMethod {
        /// The rejected method string
        method: String,
    },
    /// No allowed origins at all; every cross-origin request would be invalid
    EmptyOrigins,
}

impl fmt::Display for CorsConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorsConfigError::WildcardWithCredentials => {
                write!(
                    f,
                    "CORS configuration error: Cannot use wildcard origin (*) with credentials \
                    in strict mode. Specify exact origins or disable strict mode."
                )
            }
            CorsConfigError::InvalidOriginFormat { origin } => {
                write!(
                    f,
                    "CORS configuration error: Invalid origin format '{}'. \
                    Expected format: scheme://host:port (e.g., https://example.com)",
                    origin
                )
            }
            CorsConfigError::InvalidMethod { method } => {
                write!(
                    f,
                    "CORS configuration error: Invalid HTTP method '{}'",
                    method
                )
            }
            CorsConfigError::EmptyOrigins => {
                write!(
                    f,
                    "CORS configuration error: The allowed origins list is empty. \
                    Use [\"*\"] to allow any origin."
                )
            }
        }
    }
}

impl std::error::Error for CorsConfigError {}
