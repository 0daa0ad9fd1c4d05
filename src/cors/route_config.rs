use serde::Deserialize;
use std::collections::HashMap;

use super::CorsPolicyOverrides;

/// Route-specific CORS policy
///
/// Determines how CORS should be handled for a specific handler:
/// - `Inherit`: Use the middleware's global overrides (default)
/// - `Disabled`: Skip CORS entirely for this route (no CORS headers)
/// - `Custom`: Layer route-specific overrides on top of the global ones
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawRouteCorsPolicy")]
pub enum RouteCorsPolicy {
    #[default]
    Inherit,
    Disabled,
    Custom(CorsPolicyOverrides),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRouteCorsPolicy {
    Flag(bool),
    Keyword(String),
    Custom(CorsPolicyOverrides),
}

impl TryFrom<RawRouteCorsPolicy> for RouteCorsPolicy {
    type Error = String;

    fn try_from(raw: RawRouteCorsPolicy) -> Result<Self, Self::Error> {
        match raw {
            RawRouteCorsPolicy::Flag(true) => Ok(RouteCorsPolicy::Inherit),
            RawRouteCorsPolicy::Flag(false) => Ok(RouteCorsPolicy::Disabled),
            RawRouteCorsPolicy::Keyword(k) => match k.trim().to_ascii_lowercase().as_str() {
                "inherit" => Ok(RouteCorsPolicy::Inherit),
                "disabled" | "off" => Ok(RouteCorsPolicy::Disabled),
                other => Err(format!(
                    "unknown route CORS policy '{other}' (expected inherit, disabled, false or a mapping)"
                )),
            },
            RawRouteCorsPolicy::Custom(o) => Ok(RouteCorsPolicy::Custom(o)),
        }
    }
}

/// Build the lookup map keyed by handler name
///
/// Only non-`Inherit` policies are stored; a missing entry means inherit.
/// Called once at startup so the hot path is a single `HashMap` lookup.
pub fn build_route_cors_map<I, S>(routes: I) -> HashMap<String, RouteCorsPolicy>
where
    I: IntoIterator<Item = (S, RouteCorsPolicy)>,
    S: Into<String>,
{
    routes
        .into_iter()
        .filter(|(_, policy)| *policy != RouteCorsPolicy::Inherit)
        .map(|(name, policy)| (name.into(), policy))
        .collect()
}
