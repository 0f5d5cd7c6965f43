//! Fix proposal types.

use serde::{Deserialize, Serialize};

/// Structured result of one model analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixProposal {
    /// Sentry issue ID this proposal belongs to.
    pub issue_id: String,
    /// Free-form analysis prose.
    pub analysis: String,
    /// Proposed changes in the order the model presented them.
    pub proposed_changes: Vec<ProposedChange>,
    /// Self-reported reliability of the proposal.
    pub confidence: Confidence,
}

/// One proposed change to one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedChange {
    /// File path as stated by the model.
    pub file: String,
    /// What the change does.
    pub description: String,
    /// Replacement code, when the model provided a code block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Coarse self-reported reliability label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Default for Confidence {
    fn default() -> Self {
        Self::Medium
    }
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proposal_serialization() {
        let proposal = FixProposal {
            issue_id: "12345".into(),
            analysis: "Null deref in render path.".into(),
            proposed_changes: vec![ProposedChange {
                file: "src/a.ts".into(),
                description: "Guard against undefined".into(),
                code: Some("if (!x) return;".into()),
            }],
            confidence: Confidence::High,
        };

        let json = serde_json::to_value(&proposal).unwrap();
        assert_eq!(json["issueId"], "12345");
        assert_eq!(json["proposedChanges"][0]["file"], "src/a.ts");
        assert_eq!(json["confidence"], "high");

        let parsed: FixProposal = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.confidence, Confidence::High);
    }

    #[test]
    fn test_code_omitted_when_absent() {
        let change = ProposedChange {
            file: "src/a.ts".into(),
            description: "desc".into(),
            code: None,
        };
        let json = serde_json::to_string(&change).unwrap();
        assert!(!json.contains("code"));
    }

    #[test]
    fn test_confidence_default() {
        assert_eq!(Confidence::default(), Confidence::Medium);
        assert_eq!(Confidence::default().as_str(), "medium");
    }
}
