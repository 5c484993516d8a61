//! Comparison operator execution

use authrule_core::{Operator, Value};

/// Apply a DSL operator to a resolved field value and the rule operand
pub(crate) fn compare(left: &Value, op: Operator, right: &Value) -> bool {
    match op {
        Operator::Equals => left.loose_eq(right),
        Operator::NotEquals => !left.loose_eq(right),
        Operator::GreaterThan => match (left.as_number(), right.as_number()) {
            (Some(l), Some(r)) => l > r,
            _ => false,
        },
        Operator::LessThan => match (left.as_number(), right.as_number()) {
            (Some(l), Some(r)) => l < r,
            _ => false,
        },
        Operator::In => match right.as_array() {
            Some(list) => list.iter().any(|item| left.loose_eq(item)),
            None => false,
        },
        Operator::NotIn => match right.as_array() {
            Some(list) => !list.iter().any(|item| left.loose_eq(item)),
            None => false,
        },
        Operator::Contains => match left.as_array() {
            Some(list) => list.iter().any(|item| item.loose_eq(right)),
            None => false,
        },
        Operator::Unknown => {
            tracing::warn!("Unknown operator in condition, comparison evaluates to false");
            false
        }
    }
}
