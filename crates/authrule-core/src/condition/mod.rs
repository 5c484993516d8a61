//! Condition DSL
//!
//! Rules created without native code describe their condition as a tree of
//! comparisons combined with `all` (AND) and `any` (OR).
//!
//! # Syntax
//!
//! ```yaml
//! condition:
//!   all:
//!     - field: transaction.amount
//!       operator: GREATER_THAN
//!       value: 100
//!     - any:
//!         - field: transaction.location.country
//!           operator: IN
//!           value: [FR, DE]
//!         - field: card.cardType
//!           operator: EQUALS
//!           value: PREPAID
//! ```
//!
//! `and` / `or` are accepted as aliases of `all` / `any`.
//!
//! ## Supported Operators
//! - `EQUALS`, `NOT_EQUALS` (loose equality)
//! - `GREATER_THAN`, `LESS_THAN` (numeric)
//! - `IN`, `NOT_IN` (membership in a list operand)
//! - `CONTAINS` (field is a list holding the operand)

mod types;

pub use types::{Comparison, ConditionNode};
