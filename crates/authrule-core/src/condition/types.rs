//! Condition DSL types

use crate::ast::operator::Operator;
use crate::types::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A declarative condition tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionNode {
    /// All children must be true (AND); empty is true
    All {
        #[serde(alias = "and")]
        all: Vec<ConditionNode>,
    },
    /// At least one child must be true (OR); empty is false
    Any {
        #[serde(alias = "or")]
        any: Vec<ConditionNode>,
    },
    /// Leaf comparison against a context field
    Compare(Comparison),
}

/// Leaf comparison `field <operator> value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// Dot-separated path into the context (e.g. "transaction.amount")
    pub field: String,
    pub operator: Operator,
    #[serde(default = "null_value")]
    pub value: Value,
}

fn null_value() -> Value {
    Value::Null
}

impl ConditionNode {
    /// Create an AND node
    pub fn all(children: Vec<ConditionNode>) -> Self {
        ConditionNode::All { all: children }
    }

    /// Create an OR node
    pub fn any(children: Vec<ConditionNode>) -> Self {
        ConditionNode::Any { any: children }
    }

    /// Create a comparison leaf
    pub fn compare(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        ConditionNode::Compare(Comparison {
            field: field.into(),
            operator,
            value: value.into(),
        })
    }

    /// All comparison leaves, depth first
    pub fn comparisons(&self) -> Vec<&Comparison> {
        let mut result = Vec::new();
        self.collect_comparisons(&mut result);
        result
    }

    fn collect_comparisons<'a>(&'a self, result: &mut Vec<&'a Comparison>) {
        match self {
            ConditionNode::All { all: children } | ConditionNode::Any { any: children } => {
                for child in children {
                    child.collect_comparisons(result);
                }
            }
            ConditionNode::Compare(c) => result.push(c),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = serde_json::to_string(&self.value).unwrap_or_else(|_| "?".to_string());
        write!(f, "{} {} {}", self.field, self.operator, value)
    }
}
