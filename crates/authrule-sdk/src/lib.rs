//! Authorization Rule Engine SDK
//!
//! High-level API for booting the rule engine, authorizing transactions and
//! administering rules at runtime.

pub mod authorization;
pub mod builder;
pub mod builtin;
pub mod config;
pub mod error;

// Re-export main types
pub use authorization::{AuthorizationEngine, AuthorizationResponse, ImportSummary, RuleFilter, RuleUpdate};
pub use builder::AuthorizationEngineBuilder;
pub use config::EngineConfig;
pub use error::{Result, SdkError};

// Re-export commonly used types from dependencies
pub use authrule_core::{
    Account, Card, CardStatus, CardType, Condition, ConditionNode, Decision, MatchedRule, Operator, Rule,
    RuleAction, RuleCategory, RuleDefinition, RuleSource, Transaction, TransactionContext, Value,
};
pub use authrule_repository::{FileRuleStateStore, MemoryRuleStateStore, RuleSnapshot, RuleStateStore};
pub use authrule_runtime::{EvaluationTrace, MetricsSnapshot, RuleEngine, RuleStats};
