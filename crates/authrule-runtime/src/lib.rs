//! Authrule Runtime - Rule evaluation for authorization decisions
//!
//! This crate evaluates an ordered set of authorization rules against a
//! transaction context:
//! - Condition evaluation for native predicates and the declarative DSL
//! - Template rule factory
//! - In-memory rule repository with stable priority ordering
//! - The rule engine and the decision resolver
//! - Evaluation traces and metrics

pub mod engine;
pub mod evaluator;
pub mod factory;
pub mod observability;
pub mod repository;
pub mod resolver;
pub mod trace;

// Re-export main types
pub use engine::{Evaluation, RuleEngine, RuleStats};
pub use evaluator::{ConditionEvaluator, ConditionOutcome, EvaluationScope};
pub use factory::{codes, RuleFactory, TemplateRuleFactory};
pub use observability::{Metrics, MetricsCollector, MetricsSnapshot};
pub use repository::RuleRepository;
pub use resolver::{DecisionResolver, FALLBACK_RESPONSE_MESSAGE};
pub use trace::{ConditionTrace, EvaluationTrace, RuleTrace};
