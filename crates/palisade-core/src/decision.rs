//! Decision aggregation: maps a final verdict to the binary gate decision.
//!
//! By the time this stage runs, every failure has already been resolved
//! upstream (including fail-closed defaulting), so aggregation is a pure,
//! infallible mapping.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::catalog::{PolicyCatalog, PolicyDirective};
use crate::verdict::PolicyVerdict;

/// The gate's answer for one screened input.
#[derive(Debug, Clone, Serialize)]
pub struct GateDecision {
    /// Whether the primary system may process the input
    pub proceed: bool,

    /// User-facing explanation of the outcome
    pub message: String,

    /// Full directives for each cited policy, in verdict order
    pub triggered: Vec<PolicyDirective>,

    /// When the decision was produced
    pub evaluated_at: DateTime<Utc>,
}

/// Map a final verdict to a [`GateDecision`].
///
/// `proceed` is true exactly when the status is compliant. Cited names
/// are resolved to their full catalog directives; for validated verdicts
/// every name resolves, and the synthesized fail-closed verdict cites
/// nothing.
pub fn aggregate(verdict: &PolicyVerdict, catalog: &PolicyCatalog) -> GateDecision {
    let triggered: Vec<PolicyDirective> = verdict
        .triggered_policies
        .iter()
        .filter_map(|name| catalog.resolve(name))
        .cloned()
        .collect();

    let message = if verdict.is_compliant() {
        "Input passed content policy checks.".to_string()
    } else {
        format!("Input rejected by policy enforcer: {}", verdict.evaluation_summary)
    };

    GateDecision {
        proceed: verdict.is_compliant(),
        message,
        triggered,
        evaluated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verdict::ComplianceStatus;

    fn catalog() -> PolicyCatalog {
        PolicyCatalog::baseline()
    }

    #[test]
    fn test_compliant_proceeds() {
        let verdict = PolicyVerdict {
            compliance_status: ComplianceStatus::Compliant,
            evaluation_summary: "factual question".to_string(),
            triggered_policies: vec![],
        };
        let decision = aggregate(&verdict, &catalog());
        assert!(decision.proceed);
        assert!(decision.triggered.is_empty());
        assert_eq!(decision.message, "Input passed content policy checks.");
    }

    #[test]
    fn test_non_compliant_blocks_with_directives() {
        let verdict = PolicyVerdict {
            compliance_status: ComplianceStatus::NonCompliant,
            evaluation_summary: "attempted policy bypass".to_string(),
            triggered_policies: vec![
                "Instruction Subversion Attempts".to_string(),
                "Prohibited Content Directives".to_string(),
            ],
        };
        let decision = aggregate(&verdict, &catalog());
        assert!(!decision.proceed);
        assert_eq!(decision.triggered.len(), 2);
        assert_eq!(decision.triggered[0].ordinal, 1);
        assert_eq!(decision.triggered[1].ordinal, 2);
        assert!(decision.message.contains("attempted policy bypass"));
    }

    #[test]
    fn test_verdict_citation_order_preserved() {
        let verdict = PolicyVerdict {
            compliance_status: ComplianceStatus::NonCompliant,
            evaluation_summary: "multiple violations".to_string(),
            triggered_policies: vec![
                "Proprietary or Competitive Information".to_string(),
                "Instruction Subversion Attempts".to_string(),
            ],
        };
        let decision = aggregate(&verdict, &catalog());
        // Verdict order, not ordinal order
        assert_eq!(decision.triggered[0].ordinal, 4);
        assert_eq!(decision.triggered[1].ordinal, 1);
    }

    #[test]
    fn test_decision_serializes() {
        let verdict = PolicyVerdict {
            compliance_status: ComplianceStatus::Compliant,
            evaluation_summary: "ok".to_string(),
            triggered_policies: vec![],
        };
        let decision = aggregate(&verdict, &catalog());
        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(json["proceed"], true);
        assert!(json["evaluated_at"].is_string());
    }
}
