//! # palisade-core
//!
//! Deterministic half of the palisade guardrail: policy catalog, verdict
//! parsing, schema validation, and the final gate decision.
//!
//! This crate answers one question about an evaluator reply:
//! - Is this a well-formed, internally consistent policy verdict?
//! - And if so, may the screened input proceed?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same input always produces same output
//! 2. **No LLM calls**: Talking to the evaluator model is
//!    `palisade-runtime`'s job
//! 3. **Closed catalog**: A verdict can only cite directives that exist;
//!    unknown references fail validation loudly
//! 4. **Stateless**: Nothing persists across calls except the read-only
//!    catalog
//!
//! ## Example
//!
//! ```rust,ignore
//! use palisade_core::{aggregate, extract_verdict, validate, PolicyCatalog};
//!
//! let catalog = PolicyCatalog::baseline();
//! let candidate = extract_verdict(raw_model_reply)?;
//! let verdict = validate(&candidate, &catalog)?;
//! let decision = aggregate(&verdict, &catalog);
//!
//! if decision.proceed {
//!     println!("OK: {}", decision.message);
//! }
//! ```

pub mod catalog;
pub mod decision;
pub mod parser;
pub mod validator;
pub mod verdict;

// Re-export main types at crate root
pub use catalog::{CatalogError, PolicyCatalog, PolicyDirective};
pub use decision::{aggregate, GateDecision};
pub use parser::{extract_verdict, ParseError};
pub use validator::{validate, ValidationError};
pub use verdict::{CandidateVerdict, ComplianceStatus, PolicyVerdict};
