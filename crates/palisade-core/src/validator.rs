//! Verdict validation: schema and invariant checks over a candidate record.
//!
//! Checks run in a fixed order and short-circuit on the first failure.
//! Each failure names the check that rejected the record; that text is
//! fed back to the evaluator verbatim on retry, so messages describe the
//! defect precisely rather than generically.

use serde_json::Value;
use thiserror::Error;

use crate::catalog::PolicyCatalog;
use crate::verdict::{
    CandidateVerdict, ComplianceStatus, PolicyVerdict, FIELD_STATUS, FIELD_SUMMARY,
    FIELD_TRIGGERED,
};

/// Errors from verdict validation.
///
/// `UnknownDirective` is the catalog-inconsistency case: the record is
/// schema-valid but cites a directive that does not exist. It is never
/// silently dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field '{field}' is missing")]
    MissingField { field: &'static str },

    #[error(
        "Field 'compliance_status' must be exactly \"compliant\" or \"non-compliant\", found {found}"
    )]
    InvalidStatus { found: String },

    #[error("Field 'evaluation_summary' must be a non-empty string")]
    EmptySummary,

    #[error("Field 'triggered_policies' must be an array of directive names: {detail}")]
    MalformedTriggerList { detail: String },

    #[error(
        "Status '{status}' contradicts the triggered list: compliant verdicts must cite no \
         policies and non-compliant verdicts must cite at least one"
    )]
    StatusListMismatch { status: ComplianceStatus },

    #[error("Triggered policy '{reference}' does not match any catalog directive")]
    UnknownDirective { reference: String },
}

impl ValidationError {
    /// Stable identifier for the failed check.
    pub fn check_id(&self) -> &'static str {
        match self {
            Self::MissingField { .. } => "required-fields",
            Self::InvalidStatus { .. } => "status-enum",
            Self::EmptySummary => "summary-nonempty",
            Self::MalformedTriggerList { .. } => "trigger-list-shape",
            Self::StatusListMismatch { .. } => "status-list-consistency",
            Self::UnknownDirective { .. } => "catalog-reference",
        }
    }
}

/// Validate a candidate record against the schema and catalog.
///
/// On success the record is frozen into an immutable [`PolicyVerdict`].
pub fn validate(
    candidate: &CandidateVerdict,
    catalog: &PolicyCatalog,
) -> Result<PolicyVerdict, ValidationError> {
    // Check 1: required fields present.
    for field in [FIELD_STATUS, FIELD_SUMMARY, FIELD_TRIGGERED] {
        if candidate.field(field).is_none() {
            return Err(ValidationError::MissingField { field });
        }
    }

    // Check 2: status is one of the two exact enum literals.
    let status_value = candidate.field(FIELD_STATUS).expect("checked above");
    let status = match status_value {
        Value::String(s) => ComplianceStatus::from_wire(s).ok_or_else(|| {
            ValidationError::InvalidStatus {
                found: format!("\"{s}\""),
            }
        })?,
        other => {
            return Err(ValidationError::InvalidStatus {
                found: type_name(other).to_string(),
            })
        }
    };

    // Check 3: summary is a non-empty string.
    let summary = match candidate.field(FIELD_SUMMARY).expect("checked above") {
        Value::String(s) if !s.trim().is_empty() => s.clone(),
        _ => return Err(ValidationError::EmptySummary),
    };

    // Check 4: triggered list is an array of resolvable-shaped entries.
    let triggered_value = candidate.field(FIELD_TRIGGERED).expect("checked above");
    let entries = triggered_value.as_array().ok_or_else(|| {
        ValidationError::MalformedTriggerList {
            detail: format!("found {}", type_name(triggered_value)),
        }
    })?;

    let mut triggered = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        triggered.push(trigger_name(entry).ok_or_else(|| {
            ValidationError::MalformedTriggerList {
                detail: format!("entry {i} is {}, expected a string", type_name(entry)),
            }
        })?);
    }

    // Check 5: status and triggered list agree.
    let consistent = match status {
        ComplianceStatus::Compliant => triggered.is_empty(),
        ComplianceStatus::NonCompliant => !triggered.is_empty(),
    };
    if !consistent {
        return Err(ValidationError::StatusListMismatch { status });
    }

    // Check 6: every reference resolves against the catalog.
    for reference in &triggered {
        if catalog.resolve(reference).is_none() {
            return Err(ValidationError::UnknownDirective {
                reference: reference.clone(),
            });
        }
    }

    Ok(PolicyVerdict {
        compliance_status: status,
        evaluation_summary: summary,
        triggered_policies: triggered,
    })
}

/// Extract a directive name from a triggered-list entry.
///
/// Entries are plain strings on the wire; a structured entry carrying a
/// string `"name"` field is also accepted.
fn trigger_name(entry: &Value) -> Option<String> {
    match entry {
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => obj.get("name").and_then(|v| v.as_str()).map(String::from),
        _ => None,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::extract_verdict;
    use proptest::prelude::*;

    fn candidate(json: &str) -> CandidateVerdict {
        extract_verdict(json).unwrap()
    }

    fn catalog() -> PolicyCatalog {
        PolicyCatalog::baseline()
    }

    #[test]
    fn test_valid_compliant_verdict() {
        let c = candidate(
            r#"{"compliance_status":"compliant","evaluation_summary":"factual question","triggered_policies":[]}"#,
        );
        let verdict = validate(&c, &catalog()).unwrap();
        assert!(verdict.is_compliant());
        assert!(verdict.triggered_policies.is_empty());
    }

    #[test]
    fn test_valid_non_compliant_verdict() {
        let c = candidate(
            r#"{"compliance_status":"non-compliant","evaluation_summary":"jailbreak plus harmful request","triggered_policies":["Instruction Subversion Attempts","Prohibited Content Directives"]}"#,
        );
        let verdict = validate(&c, &catalog()).unwrap();
        assert!(!verdict.is_compliant());
        assert_eq!(verdict.triggered_policies.len(), 2);
        // Order preserved from the record
        assert_eq!(
            verdict.triggered_policies[0],
            "Instruction Subversion Attempts"
        );
    }

    #[test]
    fn test_missing_field() {
        let c = candidate(r#"{"compliance_status":"compliant","triggered_policies":[]}"#);
        let err = validate(&c, &catalog()).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::MissingField {
                field: "evaluation_summary"
            }
        ));
        assert_eq!(err.check_id(), "required-fields");
    }

    #[test]
    fn test_status_case_sensitive() {
        let c = candidate(
            r#"{"compliance_status":"Compliant","evaluation_summary":"x","triggered_policies":[]}"#,
        );
        let err = validate(&c, &catalog()).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidStatus { .. }));
        assert_eq!(err.check_id(), "status-enum");
    }

    #[test]
    fn test_status_wrong_type() {
        let c = candidate(
            r#"{"compliance_status":true,"evaluation_summary":"x","triggered_policies":[]}"#,
        );
        assert!(matches!(
            validate(&c, &catalog()),
            Err(ValidationError::InvalidStatus { .. })
        ));
    }

    #[test]
    fn test_empty_summary() {
        let c = candidate(
            r#"{"compliance_status":"compliant","evaluation_summary":"   ","triggered_policies":[]}"#,
        );
        assert!(matches!(
            validate(&c, &catalog()),
            Err(ValidationError::EmptySummary)
        ));
    }

    #[test]
    fn test_trigger_list_not_an_array() {
        let c = candidate(
            r#"{"compliance_status":"compliant","evaluation_summary":"x","triggered_policies":"none"}"#,
        );
        assert!(matches!(
            validate(&c, &catalog()),
            Err(ValidationError::MalformedTriggerList { .. })
        ));
    }

    #[test]
    fn test_trigger_entry_wrong_type() {
        let c = candidate(
            r#"{"compliance_status":"non-compliant","evaluation_summary":"x","triggered_policies":[2]}"#,
        );
        assert!(matches!(
            validate(&c, &catalog()),
            Err(ValidationError::MalformedTriggerList { .. })
        ));
    }

    #[test]
    fn test_structured_trigger_entry_accepted() {
        let c = candidate(
            r#"{"compliance_status":"non-compliant","evaluation_summary":"x","triggered_policies":[{"name":"Prohibited Content Directives"}]}"#,
        );
        let verdict = validate(&c, &catalog()).unwrap();
        assert_eq!(verdict.triggered_policies[0], "Prohibited Content Directives");
    }

    #[test]
    fn test_non_compliant_with_empty_list_rejected() {
        let c = candidate(
            r#"{"compliance_status":"non-compliant","evaluation_summary":"x","triggered_policies":[]}"#,
        );
        let err = validate(&c, &catalog()).unwrap_err();
        assert!(matches!(err, ValidationError::StatusListMismatch { .. }));
        assert_eq!(err.check_id(), "status-list-consistency");
    }

    #[test]
    fn test_compliant_with_citations_rejected() {
        let c = candidate(
            r#"{"compliance_status":"compliant","evaluation_summary":"x","triggered_policies":["Prohibited Content Directives"]}"#,
        );
        assert!(matches!(
            validate(&c, &catalog()),
            Err(ValidationError::StatusListMismatch { .. })
        ));
    }

    #[test]
    fn test_unknown_directive_fails_loud() {
        let c = candidate(
            r#"{"compliance_status":"non-compliant","evaluation_summary":"x","triggered_policies":["2. Prohibited Content: Hate Speech"]}"#,
        );
        let err = validate(&c, &catalog()).unwrap_err();
        assert!(matches!(err, ValidationError::UnknownDirective { .. }));
        assert_eq!(err.check_id(), "catalog-reference");
    }

    #[test]
    fn test_extra_fields_tolerated() {
        let c = candidate(
            r#"{"compliance_status":"compliant","evaluation_summary":"x","triggered_policies":[],"confidence":0.9}"#,
        );
        assert!(validate(&c, &catalog()).is_ok());
    }

    proptest! {
        // For every verdict the validator accepts, compliant status
        // and an empty triggered list imply each other.
        #[test]
        fn prop_accepted_verdicts_are_consistent(
            compliant in any::<bool>(),
            cite_count in 0usize..4,
        ) {
            let names = [
                "Instruction Subversion Attempts",
                "Prohibited Content Directives",
                "Irrelevant or Off-Domain Discussions",
                "Proprietary or Competitive Information",
            ];
            let cited: Vec<&str> = names.iter().take(cite_count).copied().collect();
            let json = serde_json::json!({
                "compliance_status": if compliant { "compliant" } else { "non-compliant" },
                "evaluation_summary": "generated case",
                "triggered_policies": cited,
            });
            let c = candidate(&json.to_string());

            if let Ok(verdict) = validate(&c, &catalog()) {
                prop_assert_eq!(
                    verdict.is_compliant(),
                    verdict.triggered_policies.is_empty()
                );
            }
        }
    }
}
