//! Rule model definitions
//!
//! This module contains the rule model:
//! - Rule: unit of policy with its condition
//! - RuleDefinition: declarative form supplied at runtime
//! - MatchedRule / Decision: evaluation output
//! - Operator: comparison operators of the condition DSL

pub mod operator;
pub mod rule;

pub use operator::Operator;
pub use rule::{
    Condition, Decision, MatchedRule, Predicate, Rule, RuleAction, RuleCategory, RuleDefinition,
    RuleSource, RuleState,
};
