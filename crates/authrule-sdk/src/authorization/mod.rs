//! AuthorizationEngine - authorization and rule administration API
//!
//! The engine owns the rule engine and the rule state store. Authorizations
//! are synchronous and never fail; admin operations are async because every
//! mutation is persisted before it returns.

mod engine;
mod types;

pub use engine::AuthorizationEngine;
pub(crate) use engine::validate_rule_definition;
pub use types::{AuthorizationResponse, ImportSummary, RuleFilter, RuleUpdate};
