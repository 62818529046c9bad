//! The policy gate: evaluation pipeline with bounded retry and fail-closed
//! defaulting.
//!
//! One `evaluate()` call walks Composing → Invoking → Parsing → Validating;
//! a parse or validation rejection loops back to Invoking with corrective
//! context until the attempt budget runs out, at which point the gate
//! synthesizes a blocking verdict. Transport failures never enter the loop:
//! "the policy engine is down" must stay distinguishable from "the input
//! was rejected".

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use palisade_core::{
    aggregate, extract_verdict, validate, ComplianceStatus, GateDecision, ParseError,
    PolicyCatalog, PolicyVerdict, ValidationError,
};

use crate::prompts::{compose_review_prompt, corrective_note, ENFORCER_SYSTEM_PROMPT};
use crate::providers::{ChatMessage, CompletionConfig, LlmProvider, ProviderError};

/// Errors surfaced to callers of [`PolicyGate::evaluate`].
///
/// Content-level failures never appear here; they are recovered via retry
/// or resolved into a fail-closed [`GateDecision`].
#[derive(Error, Debug)]
pub enum GateError {
    /// The evaluator service could not be reached or timed out.
    /// Fatal for the request; not retried.
    #[error("Policy evaluator unavailable: {0}")]
    EvaluatorUnavailable(#[source] ProviderError),

    /// The gate was built without a required component.
    #[error("Gate not configured: {0}")]
    NotConfigured(String),
}

/// Why one evaluator reply was rejected.
#[derive(Error, Debug, Clone)]
enum Rejection {
    #[error("{0}")]
    Unparsable(#[source] ParseError),

    #[error("{0}")]
    Invalid(#[source] ValidationError),
}

impl Rejection {
    fn check_id(&self) -> &'static str {
        match self {
            Rejection::Unparsable(_) => "verdict-extraction",
            Rejection::Invalid(e) => e.check_id(),
        }
    }
}

/// Configuration for the evaluation pipeline.
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Total invocation budget per `evaluate()` call (first attempt plus
    /// retries). The provider is invoked at most this many times.
    pub max_attempts: u32,

    /// Timeout applied independently to each attempt. A timeout on one
    /// attempt does not shorten the budget of the next.
    pub attempt_timeout: Duration,

    /// Model parameters for the evaluator call.
    pub completion: CompletionConfig,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            attempt_timeout: Duration::from_secs(15),
            completion: CompletionConfig::default(),
        }
    }
}

/// The policy enforcement gate.
///
/// Screens one input per [`evaluate`](Self::evaluate) call and returns
/// exactly one [`GateDecision`]. Holds no mutable state: concurrent
/// evaluations share only the read-only catalog and configuration.
pub struct PolicyGate {
    provider: Arc<dyn LlmProvider>,
    catalog: PolicyCatalog,
    config: GateConfig,
}

impl PolicyGate {
    /// Create a gate with the default configuration.
    pub fn new(provider: Arc<dyn LlmProvider>, catalog: PolicyCatalog) -> Self {
        Self {
            provider,
            catalog,
            config: GateConfig::default(),
        }
    }

    /// Start building a gate.
    pub fn builder() -> PolicyGateBuilder {
        PolicyGateBuilder::new()
    }

    /// The catalog this gate enforces.
    pub fn catalog(&self) -> &PolicyCatalog {
        &self.catalog
    }

    /// Screen one input and return the gate decision.
    ///
    /// Returns `Err(GateError::EvaluatorUnavailable)` only for transport
    /// failures; every content outcome, including exhausted retries, is a
    /// `GateDecision` (fail-closed: exhaustion blocks, never allows).
    pub async fn evaluate(&self, input_text: &str) -> Result<GateDecision, GateError> {
        let review_prompt = compose_review_prompt(&self.catalog, input_text);
        let mut conversation = vec![
            ChatMessage::system(ENFORCER_SYSTEM_PROMPT),
            ChatMessage::user(review_prompt),
        ];

        let max_attempts = self.config.max_attempts.max(1);
        let mut last_rejection: Option<Rejection> = None;

        for attempt in 1..=max_attempts {
            let response = match tokio::time::timeout(
                self.config.attempt_timeout,
                self.provider
                    .complete(conversation.clone(), &self.config.completion),
            )
            .await
            {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => return Err(GateError::EvaluatorUnavailable(e)),
                Err(_) => {
                    return Err(GateError::EvaluatorUnavailable(ProviderError::Timeout(
                        self.config.attempt_timeout,
                    )))
                }
            };

            tracing::debug!(
                attempt,
                provider = self.provider.name(),
                tokens = response.usage.total(),
                raw = %response.content,
                "evaluator reply"
            );

            let rejection = match extract_verdict(&response.content) {
                Ok(candidate) => match validate(&candidate, &self.catalog) {
                    Ok(verdict) => {
                        tracing::debug!(
                            attempt,
                            status = %verdict.compliance_status,
                            "verdict accepted"
                        );
                        return Ok(aggregate(&verdict, &self.catalog));
                    }
                    Err(e) => Rejection::Invalid(e),
                },
                Err(e) => Rejection::Unparsable(e),
            };

            tracing::warn!(
                attempt,
                check = rejection.check_id(),
                reason = %rejection,
                "evaluator reply rejected"
            );

            if attempt < max_attempts {
                // Feed the rejected reply and the precise failure back so
                // the next attempt can correct it.
                conversation.push(ChatMessage::assistant(response.content));
                conversation.push(ChatMessage::user(corrective_note(
                    rejection.check_id(),
                    &rejection.to_string(),
                )));
            }
            last_rejection = Some(rejection);
        }

        let verdict = self.fail_closed_verdict(max_attempts, last_rejection);
        tracing::warn!(
            attempts = max_attempts,
            "no valid verdict produced, failing closed"
        );
        Ok(aggregate(&verdict, &self.catalog))
    }

    /// Synthesize the blocking verdict used when every attempt was rejected.
    fn fail_closed_verdict(&self, attempts: u32, last: Option<Rejection>) -> PolicyVerdict {
        let detail = last
            .map(|r| r.to_string())
            .unwrap_or_else(|| "no attempts were made".to_string());

        PolicyVerdict {
            compliance_status: ComplianceStatus::NonCompliant,
            evaluation_summary: format!(
                "The policy evaluator failed to produce a valid verdict after {attempts} \
                 attempt(s); last rejection: {detail}"
            ),
            triggered_policies: vec![],
        }
    }
}

/// Builder for [`PolicyGate`].
pub struct PolicyGateBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    catalog: Option<PolicyCatalog>,
    config: GateConfig,
}

impl PolicyGateBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            catalog: None,
            config: GateConfig::default(),
        }
    }

    /// Set the evaluator provider.
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the policy catalog (defaults to [`PolicyCatalog::baseline`]).
    pub fn catalog(mut self, catalog: PolicyCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Set the pipeline configuration.
    pub fn config(mut self, config: GateConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the total attempt budget.
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.config.max_attempts = max_attempts;
        self
    }

    /// Set the per-attempt timeout.
    pub fn attempt_timeout(mut self, timeout: Duration) -> Self {
        self.config.attempt_timeout = timeout;
        self
    }

    /// Build the gate.
    pub fn build(self) -> Result<PolicyGate, GateError> {
        let provider = self
            .provider
            .ok_or_else(|| GateError::NotConfigured("No provider set".to_string()))?;
        let catalog = self.catalog.unwrap_or_else(PolicyCatalog::baseline);

        Ok(PolicyGate {
            provider,
            catalog,
            config: self.config,
        })
    }
}

impl Default for PolicyGateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
