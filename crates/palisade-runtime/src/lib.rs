//! # palisade-runtime
//!
//! The LLM half of the palisade guardrail: evaluator providers, prompt
//! composition, and the retry/fail-closed evaluation pipeline.
//!
//! `palisade-core` decides whether an evaluator reply is a valid verdict;
//! this crate owns everything that touches the model: composing the
//! review prompt, making the single outbound call, retrying with
//! corrective feedback when the reply is rejected, and defaulting to a
//! blocking decision when the attempt budget runs out.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use palisade_runtime::{GeminiProvider, PolicyGate};
//!
//! let provider = Arc::new(GeminiProvider::from_env()?);
//! let gate = PolicyGate::builder().provider(provider).build()?;
//!
//! let decision = gate.evaluate("What is the capital of France?").await?;
//! if decision.proceed {
//!     // hand the input to the primary system
//! }
//! ```
//!
//! ## Failure semantics
//!
//! - Unparsable or schema-invalid replies are retried with corrective
//!   feedback, then resolved fail-closed (blocking, never allowing).
//! - Transport failures surface as [`GateError::EvaluatorUnavailable`]
//!   and are never converted into a content verdict: callers must be able
//!   to tell "the policy engine is down" from "the input was rejected".

pub mod gate;
pub mod prompts;
pub mod providers;

pub use gate::{GateConfig, GateError, PolicyGate, PolicyGateBuilder};
pub use prompts::{compose_review_prompt, ENFORCER_SYSTEM_PROMPT};
pub use providers::{
    ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError,
    ProviderRegistry, TokenUsage,
};

#[cfg(feature = "gemini")]
pub use providers::{GeminiProvider, GeminiProviderFactory};
