//! Refinement models (critic stage output).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::keyframe::Keyframe;

/// Severity of a refinement issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Warning,
    Suggestion,
}

/// Category of a refinement issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    Timing,
    Layout,
    Pacing,
    Consistency,
    Accessibility,
    #[serde(other)]
    Other,
}

/// A mechanical fix the orchestrator can apply without another AI call.
///
/// Only these three kinds are machine-actionable; anything else the critic
/// wants changed is reflected in the score and left for a human.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SuggestedFix {
    AdjustTiming {
        #[serde(skip_serializing_if = "Option::is_none")]
        from: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        duration_in_frames: Option<u32>,
    },
    AdjustPosition {
        x: f64,
        y: f64,
    },
    ReplaceKeyframes {
        keyframes: Vec<Keyframe>,
    },
}

/// One issue found by the critic.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RefinementIssue {
    pub severity: Severity,

    pub category: IssueCategory,

    pub description: String,

    /// Item id the issue refers to, when it targets one element
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_id: Option<String>,

    /// Scene id the issue refers to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene_id: Option<String>,

    /// Mechanical fix, when one exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<SuggestedFix>,
}

/// The critic's verdict on a composition.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RefinementResult {
    /// Quality estimate, 0-100
    pub score: u8,

    /// One-paragraph summary of the verdict
    pub summary: String,

    #[serde(default)]
    pub issues: Vec<RefinementIssue>,
}

impl RefinementResult {
    /// Clamp an AI-given score into the 0-100 range.
    pub fn with_clamped_score(mut self) -> Self {
        self.score = self.score.min(100);
        self
    }

    /// Whether the composition passes the quality gate: score at or above
    /// the minimum AND no critical issue.
    pub fn meets_threshold(&self, min_score: u8) -> bool {
        self.score >= min_score && !self.has_critical_issues()
    }

    /// Whether any issue is critical.
    pub fn has_critical_issues(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Critical)
    }

    /// Issues that carry a machine-actionable fix.
    pub fn actionable_issues(&self) -> impl Iterator<Item = &RefinementIssue> {
        self.issues.iter().filter(|i| i.fix.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(severity: Severity, fix: Option<SuggestedFix>) -> RefinementIssue {
        RefinementIssue {
            severity,
            category: IssueCategory::Timing,
            description: "test issue".to_string(),
            element_id: Some("i1".to_string()),
            scene_id: None,
            fix,
        }
    }

    #[test]
    fn test_meets_threshold_requires_score_and_no_critical() {
        let passing = RefinementResult {
            score: 80,
            summary: "good".to_string(),
            issues: vec![issue(Severity::Warning, None)],
        };
        assert!(passing.meets_threshold(70));

        let low_score = RefinementResult {
            score: 60,
            summary: "weak".to_string(),
            issues: vec![],
        };
        assert!(!low_score.meets_threshold(70));

        let critical = RefinementResult {
            score: 95,
            summary: "broken".to_string(),
            issues: vec![issue(Severity::Critical, None)],
        };
        assert!(!critical.meets_threshold(70));
    }

    #[test]
    fn test_actionable_issues_filters_fixless() {
        let result = RefinementResult {
            score: 50,
            summary: "mixed".to_string(),
            issues: vec![
                issue(
                    Severity::Warning,
                    Some(SuggestedFix::AdjustPosition { x: 0.5, y: 0.4 }),
                ),
                issue(Severity::Suggestion, None),
            ],
        };
        assert_eq!(result.actionable_issues().count(), 1);
    }

    #[test]
    fn test_suggested_fix_tagged_serialization() {
        let fix = SuggestedFix::AdjustTiming {
            from: Some(30),
            duration_in_frames: None,
        };
        let json = serde_json::to_value(&fix).unwrap();
        assert_eq!(json["action"], "adjust_timing");
        assert_eq!(json["from"], 30);
    }

    #[test]
    fn test_unknown_category_deserializes_to_other() {
        let cat: IssueCategory = serde_json::from_str("\"aesthetics\"").unwrap();
        assert_eq!(cat, IssueCategory::Other);
    }
}
