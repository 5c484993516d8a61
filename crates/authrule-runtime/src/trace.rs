//! Evaluation tracing types for explainable decisions
//!
//! These structures capture which rules were evaluated during a pass, how each
//! DSL comparison resolved, and which rule short-circuited the pass.

use authrule_core::{RuleAction, Value};
use serde::{Deserialize, Serialize};

/// Trace of a single condition evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionTrace {
    /// The condition as a string (e.g., "transaction.amount > 1000")
    pub expression: String,

    /// The resolved field value; absent when the path did not resolve
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_value: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_value: Option<Value>,

    pub result: bool,

    /// Nested conditions for logical groups (any/all)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nested: Option<Vec<ConditionTrace>>,

    /// The logical group type if this is a group ("any" or "all")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_type: Option<String>,
}

impl ConditionTrace {
    /// Create a trace for a native predicate
    pub fn native(result: bool) -> Self {
        Self {
            expression: "<native>".to_string(),
            left_value: None,
            operator: None,
            right_value: None,
            result,
            nested: None,
            group_type: None,
        }
    }

    /// Create a comparison trace
    pub fn comparison(
        expression: String,
        left_value: Option<Value>,
        operator: &str,
        right_value: Value,
        result: bool,
    ) -> Self {
        Self {
            expression,
            left_value,
            operator: Some(operator.to_string()),
            right_value: Some(right_value),
            result,
            nested: None,
            group_type: None,
        }
    }

    /// Create a logical group trace (any/all)
    pub fn group(group_type: &str, nested: Vec<ConditionTrace>, result: bool) -> Self {
        Self {
            expression: format!("{}:[...]", group_type),
            left_value: None,
            operator: None,
            right_value: None,
            result,
            nested: Some(nested),
            group_type: Some(group_type.to_string()),
        }
    }
}

/// Trace of a single rule evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleTrace {
    pub rule_id: String,

    pub rule_name: String,

    pub priority: i32,

    pub action: RuleAction,

    /// Whether the condition matched
    pub matched: bool,

    /// Fault raised by the condition, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<String>,

    pub conditions: Vec<ConditionTrace>,
}

/// Trace of a complete evaluation pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationTrace {
    /// Evaluated rules, in evaluation order
    pub rules: Vec<RuleTrace>,

    /// Id of the DENY rule that stopped the pass
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_circuited_by: Option<String>,

    /// Enabled rules never reached because of the short-circuit
    pub skipped_rules: Vec<String>,
}

impl EvaluationTrace {
    /// Ids of rules whose condition matched
    pub fn matched_rule_ids(&self) -> Vec<&str> {
        self.rules
            .iter()
            .filter(|r| r.matched)
            .map(|r| r.rule_id.as_str())
            .collect()
    }

    /// Ids of rules whose condition faulted
    pub fn faulted_rule_ids(&self) -> Vec<&str> {
        self.rules
            .iter()
            .filter(|r| r.fault.is_some())
            .map(|r| r.rule_id.as_str())
            .collect()
    }
}
