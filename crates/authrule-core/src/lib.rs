//! Authrule Core - Core types and definitions for the authorization rule engine
//!
//! This crate provides the fundamental types used across the workspace:
//! - Value types for condition evaluation
//! - Transaction context (transaction, card, account snapshots)
//! - Rule definitions, actions, matched rules and decisions
//! - Condition DSL nodes and operators
//! - ISO 8583 response code table
//! - Error types

pub mod ast;
pub mod condition;
pub mod context;
pub mod error;
pub mod response_codes;
pub mod types;

// Re-export commonly used types
pub use ast::{
    Condition, Decision, MatchedRule, Operator, Predicate, Rule, RuleAction, RuleCategory,
    RuleDefinition, RuleSource, RuleState,
};
pub use condition::{Comparison, ConditionNode};
pub use context::{
    Account, AccountStatus, Card, CardStatus, CardType, Location, Transaction, TransactionContext,
    TransactionHistory, TransactionType,
};
pub use error::CoreError;
pub use types::Value;
