use serde::Serialize;
use tracing::{debug, info};

use super::classifier::{ClassificationOutcome, CorsRequestClassifier, ORIGIN};
use super::{CorsPolicy, CorsPolicyOverrides};
use crate::dispatcher::PipelineAction;
use crate::exchange::ExchangeView;

/// Entry point invoked once per request by the surrounding pipeline
///
/// Merges caller overrides onto the component defaults, runs the
/// [`CorsRequestClassifier`] and maps its outcome to a [`PipelineAction`]:
///
/// | Outcome              | Action         |
/// |----------------------|----------------|
/// | `NotCors`            | `Continue`     |
/// | `HeadersAlreadySent` | `Continue`     |
/// | `Simple`             | `Continue`     |
/// | `Invalid`            | `ShortCircuit` |
/// | `Preflight`          | `ShortCircuit` |
///
/// An invalid origin is not an HTTP error: the staged response goes out as-is,
/// without CORS headers, and the handler never runs. A preflight never reaches
/// the resource handler either; the staged 200 with CORS headers is final.
#[derive(Debug, Clone, Default)]
pub struct CorsPolicyApplier {
    defaults: CorsPolicy,
    classifier: CorsRequestClassifier,
}

impl CorsPolicyApplier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `defaults` instead of the component defaults for unset override fields.
    #[must_use]
    pub fn with_defaults(defaults: CorsPolicy) -> Self {
        Self {
            defaults,
            classifier: CorsRequestClassifier::new(),
        }
    }

    #[must_use]
    pub fn defaults(&self) -> &CorsPolicy {
        &self.defaults
    }

    /// Merge `overrides` onto the defaults and apply the resulting policy.
    pub fn apply<E>(&self, exchange: &mut E, overrides: &CorsPolicyOverrides) -> PipelineAction
    where
        E: ExchangeView + ?Sized,
    {
        self.evaluate(exchange, overrides).action
    }

    /// Apply an already merged policy.
    pub fn apply_policy<E>(&self, exchange: &mut E, policy: &CorsPolicy) -> PipelineAction
    where
        E: ExchangeView + ?Sized,
    {
        self.evaluate_policy(exchange, policy).action
    }

    /// Like [`apply`](Self::apply), but also reports the classification outcome.
    pub fn evaluate<E>(&self, exchange: &mut E, overrides: &CorsPolicyOverrides) -> CorsDecision
    where
        E: ExchangeView + ?Sized,
    {
        if overrides.is_empty() {
            return self.evaluate_policy(exchange, &self.defaults);
        }
        let policy = overrides.merge_onto(&self.defaults);
        self.evaluate_policy(exchange, &policy)
    }

    pub fn evaluate_policy<E>(&self, exchange: &mut E, policy: &CorsPolicy) -> CorsDecision
    where
        E: ExchangeView + ?Sized,
    {
        let outcome = self.classifier.classify(exchange, policy);
        match outcome {
            ClassificationOutcome::Invalid => {
                info!(
                    origin = exchange.header_first(ORIGIN).unwrap_or_default(),
                    url = %exchange.full_url(),
                    "Invalid origin for a CORS request"
                );
            }
            ClassificationOutcome::Preflight => {
                debug!(
                    origin = exchange.header_first(ORIGIN).unwrap_or_default(),
                    "CORS preflight answered"
                );
            }
            _ => {}
        }
        CorsDecision {
            outcome,
            action: action_for(outcome),
        }
    }
}

/// Outcome of one applier call together with the action it maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CorsDecision {
    pub outcome: ClassificationOutcome,
    pub action: PipelineAction,
}

/// Pipeline action for a classification outcome
#[must_use]
pub fn action_for(outcome: ClassificationOutcome) -> PipelineAction {
    match outcome {
        ClassificationOutcome::NotCors
        | ClassificationOutcome::HeadersAlreadySent
        | ClassificationOutcome::Simple => PipelineAction::Continue,
        ClassificationOutcome::Invalid | ClassificationOutcome::Preflight => {
            PipelineAction::ShortCircuit
        }
    }
}
