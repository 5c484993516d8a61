//! Request/Response types for AuthorizationEngine

use authrule_core::{MatchedRule, Rule, RuleAction, RuleCategory};
use authrule_runtime::EvaluationTrace;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Result of one authorization
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationResponse {
    /// Unique id of this authorization
    pub request_id: Uuid,

    pub approved: bool,

    pub action: RuleAction,

    pub response_code: String,

    pub response_message: String,

    /// Six character approval code, only for approvals
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_code: Option<String>,

    /// Every matched rule, in evaluation order
    pub matched_rules: Vec<MatchedRule>,

    pub processing_time_ms: u64,

    pub timestamp: DateTime<Utc>,

    /// Present when tracing is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<EvaluationTrace>,
}

impl AuthorizationResponse {
    /// Id of the rule that decided, if any
    pub fn deciding_rule(&self) -> Option<&str> {
        self.matched_rules
            .iter()
            .find(|m| m.was_deciding)
            .map(|m| m.rule_id.as_str())
    }
}

/// Filter for listing rules; empty fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleFilter {
    #[serde(default)]
    pub category: Option<RuleCategory>,

    #[serde(default)]
    pub enabled: Option<bool>,
}

impl RuleFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: RuleCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn matches(&self, rule: &Rule) -> bool {
        self.category.map_or(true, |c| rule.category == c)
            && self.enabled.map_or(true, |e| rule.enabled == e)
    }
}

/// Partial update of a rule's administrative state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleUpdate {
    #[serde(default)]
    pub enabled: Option<bool>,

    #[serde(default)]
    pub priority: Option<i32>,
}

impl RuleUpdate {
    pub fn enabled(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
            priority: None,
        }
    }

    pub fn priority(priority: i32) -> Self {
        Self {
            enabled: None,
            priority: Some(priority),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_none() && self.priority.is_none()
    }
}

/// Outcome of a bulk import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    /// Rules installed
    pub imported: usize,

    /// Of those, how many replaced a rule with the same id
    pub replaced: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use authrule_core::Condition;

    #[test]
    fn test_rule_filter() {
        let rule = Rule::new("A", "A", RuleAction::Deny, "05", Condition::from_fn(|_| true))
            .with_category(RuleCategory::Limits)
            .with_enabled(false);

        assert!(RuleFilter::new().matches(&rule));
        assert!(RuleFilter::new().category(RuleCategory::Limits).matches(&rule));
        assert!(!RuleFilter::new().category(RuleCategory::Fraud).matches(&rule));
        assert!(RuleFilter::new().enabled(false).matches(&rule));
        assert!(!RuleFilter::new()
            .category(RuleCategory::Limits)
            .enabled(true)
            .matches(&rule));
    }

    #[test]
    fn test_rule_update_from_json() {
        let update: RuleUpdate = serde_json::from_str(r#"{"priority": 12}"#).unwrap();
        assert_eq!(update, RuleUpdate::priority(12));
        assert!(!update.is_empty());
        assert!(RuleUpdate::default().is_empty());
    }
}
