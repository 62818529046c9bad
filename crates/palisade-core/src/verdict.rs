//! Verdict types: the structured compliance judgment for one input.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Wire field names the evaluator must produce.
pub const FIELD_STATUS: &str = "compliance_status";
pub const FIELD_SUMMARY: &str = "evaluation_summary";
pub const FIELD_TRIGGERED: &str = "triggered_policies";

/// Compliance status: exactly two states, no third.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplianceStatus {
    #[serde(rename = "compliant")]
    Compliant,

    #[serde(rename = "non-compliant")]
    NonCompliant,
}

impl ComplianceStatus {
    /// Parse the exact wire literal. Case-sensitive, no synonyms.
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "compliant" => Some(Self::Compliant),
            "non-compliant" => Some(Self::NonCompliant),
            _ => None,
        }
    }

    /// The wire literal for this status.
    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Compliant => "compliant",
            Self::NonCompliant => "non-compliant",
        }
    }
}

impl std::fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// A syntactically well-formed record extracted from raw evaluator output.
///
/// Field semantics are unchecked here. The validator decides whether
/// this becomes a [`PolicyVerdict`].
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateVerdict(Map<String, Value>);

impl CandidateVerdict {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// The underlying field map.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// The canonical, validated compliance judgment for one input.
///
/// Constructed only by the validator or by the fail-closed default;
/// never mutated afterwards.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PolicyVerdict {
    /// Compliant or non-compliant
    pub compliance_status: ComplianceStatus,

    /// Human-readable rationale, always non-empty
    pub evaluation_summary: String,

    /// Cited directive names, in evaluator order.
    /// Empty iff the status is compliant.
    pub triggered_policies: Vec<String>,
}

impl PolicyVerdict {
    /// Whether the gated input may proceed.
    pub fn is_compliant(&self) -> bool {
        self.compliance_status == ComplianceStatus::Compliant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_literals() {
        assert_eq!(
            ComplianceStatus::from_wire("compliant"),
            Some(ComplianceStatus::Compliant)
        );
        assert_eq!(
            ComplianceStatus::from_wire("non-compliant"),
            Some(ComplianceStatus::NonCompliant)
        );
    }

    #[test]
    fn test_status_rejects_synonyms_and_case() {
        assert_eq!(ComplianceStatus::from_wire("Compliant"), None);
        assert_eq!(ComplianceStatus::from_wire("COMPLIANT"), None);
        assert_eq!(ComplianceStatus::from_wire("noncompliant"), None);
        assert_eq!(ComplianceStatus::from_wire("pass"), None);
        assert_eq!(ComplianceStatus::from_wire(""), None);
    }

    #[test]
    fn test_status_serde_round_trip() {
        let json = serde_json::to_string(&ComplianceStatus::NonCompliant).unwrap();
        assert_eq!(json, "\"non-compliant\"");
        let back: ComplianceStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ComplianceStatus::NonCompliant);
    }

    #[test]
    fn test_candidate_field_lookup() {
        let mut fields = Map::new();
        fields.insert(FIELD_STATUS.to_string(), Value::String("compliant".into()));
        let candidate = CandidateVerdict::new(fields);
        assert!(candidate.field(FIELD_STATUS).is_some());
        assert!(candidate.field(FIELD_SUMMARY).is_none());
    }
}
