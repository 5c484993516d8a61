//! Comparison operators for condition expressions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operator of a DSL leaf node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    /// Loose equality
    Equals,
    /// Loose inequality
    NotEquals,
    /// Numeric greater than
    GreaterThan,
    /// Numeric less than
    LessThan,
    /// Field value is a member of the operand list
    In,
    /// Field value is not a member of the operand list
    NotIn,
    /// Field is a list holding the operand
    Contains,
    /// Any operator name this engine does not know; never matches
    #[serde(other)]
    Unknown,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Operator::Equals => "==",
            Operator::NotEquals => "!=",
            Operator::GreaterThan => ">",
            Operator::LessThan => "<",
            Operator::In => "in",
            Operator::NotIn => "not in",
            Operator::Contains => "contains",
            Operator::Unknown => "?",
        };
        f.write_str(symbol)
    }
}
