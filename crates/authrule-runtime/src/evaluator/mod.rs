//! Condition evaluation
//!
//! Evaluates a single rule condition against a transaction context. Native
//! predicates are called directly; DSL trees are walked against the serialized
//! context. A predicate that returns an error or panics yields a faulted
//! [`ConditionOutcome`], which callers treat as a non-match.

mod comparison;
mod field_lookup;

use crate::trace::ConditionTrace;
use authrule_core::{Condition, ConditionNode, TransactionContext, Value};
use std::any::Any;
use std::cell::OnceCell;
use std::panic::{self, AssertUnwindSafe};

/// Result of evaluating one condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionOutcome {
    Matched,
    NotMatched,
    /// The native predicate returned an error
    Faulted(String),
    /// The native predicate panicked
    Panicked(String),
}

impl ConditionOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, ConditionOutcome::Matched)
    }

    /// Fault description, if the condition did not run to completion
    pub fn fault(&self) -> Option<&str> {
        match self {
            ConditionOutcome::Faulted(msg) | ConditionOutcome::Panicked(msg) => Some(msg),
            _ => None,
        }
    }

    fn from_bool(matched: bool) -> Self {
        if matched {
            ConditionOutcome::Matched
        } else {
            ConditionOutcome::NotMatched
        }
    }
}

/// Per-pass view of the context.
///
/// The serialized document is built on first use by a DSL condition and shared
/// by every rule of the pass.
pub struct EvaluationScope<'a> {
    context: &'a TransactionContext,
    document: OnceCell<Option<Value>>,
}

impl<'a> EvaluationScope<'a> {
    pub fn new(context: &'a TransactionContext) -> Self {
        Self {
            context,
            document: OnceCell::new(),
        }
    }

    pub fn context(&self) -> &'a TransactionContext {
        self.context
    }

    /// Serialized context, `None` if the context could not be serialized
    pub fn document(&self) -> Option<&Value> {
        self.document
            .get_or_init(|| match self.context.to_value() {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!("Failed to serialize transaction context: {}", e);
                    None
                }
            })
            .as_ref()
    }
}

/// Stateless condition evaluator
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// Evaluate a condition; faults count as non-matches
    pub fn evaluate(condition: &Condition, context: &TransactionContext) -> bool {
        let scope = EvaluationScope::new(context);
        Self::evaluate_in_scope(condition, &scope).is_match()
    }

    /// Evaluate a condition within a shared scope
    pub fn evaluate_in_scope(condition: &Condition, scope: &EvaluationScope<'_>) -> ConditionOutcome {
        match condition {
            Condition::Native(predicate) => {
                let context = scope.context();
                match panic::catch_unwind(AssertUnwindSafe(|| predicate(context))) {
                    Ok(Ok(matched)) => ConditionOutcome::from_bool(matched),
                    Ok(Err(e)) => ConditionOutcome::Faulted(e.to_string()),
                    Err(payload) => ConditionOutcome::Panicked(panic_message(payload.as_ref())),
                }
            }
            Condition::Dsl(node) => match scope.document() {
                Some(document) => ConditionOutcome::from_bool(Self::evaluate_node(node, document)),
                None => ConditionOutcome::NotMatched,
            },
        }
    }

    /// Evaluate a condition and record how it resolved
    pub fn evaluate_with_trace(
        condition: &Condition,
        scope: &EvaluationScope<'_>,
    ) -> (ConditionOutcome, Vec<ConditionTrace>) {
        match condition {
            Condition::Native(_) => {
                let outcome = Self::evaluate_in_scope(condition, scope);
                let trace = ConditionTrace::native(outcome.is_match());
                (outcome, vec![trace])
            }
            Condition::Dsl(node) => match scope.document() {
                Some(document) => {
                    let (matched, trace) = Self::evaluate_node_with_trace(node, document);
                    (ConditionOutcome::from_bool(matched), vec![trace])
                }
                None => (ConditionOutcome::NotMatched, Vec::new()),
            },
        }
    }

    /// Evaluate a DSL node against a serialized context
    pub fn evaluate_node(node: &ConditionNode, document: &Value) -> bool {
        match node {
            ConditionNode::All { all } => all.iter().all(|child| Self::evaluate_node(child, document)),
            ConditionNode::Any { any } => any.iter().any(|child| Self::evaluate_node(child, document)),
            ConditionNode::Compare(c) => match field_lookup::resolve_path(document, &c.field) {
                Some(left) => comparison::compare(left, c.operator, &c.value),
                None => {
                    tracing::debug!("Unresolved field path {}, condition is false", c.field);
                    false
                }
            },
        }
    }

    fn evaluate_node_with_trace(node: &ConditionNode, document: &Value) -> (bool, ConditionTrace) {
        match node {
            ConditionNode::All { all } => {
                let nested: Vec<ConditionTrace> = all
                    .iter()
                    .map(|child| Self::evaluate_node_with_trace(child, document).1)
                    .collect();
                let result = nested.iter().all(|t| t.result);
                (result, ConditionTrace::group("all", nested, result))
            }
            ConditionNode::Any { any } => {
                let nested: Vec<ConditionTrace> = any
                    .iter()
                    .map(|child| Self::evaluate_node_with_trace(child, document).1)
                    .collect();
                let result = nested.iter().any(|t| t.result);
                (result, ConditionTrace::group("any", nested, result))
            }
            ConditionNode::Compare(c) => {
                let left = field_lookup::resolve_path(document, &c.field);
                let result = left
                    .map(|l| comparison::compare(l, c.operator, &c.value))
                    .unwrap_or(false);
                let trace = ConditionTrace::comparison(
                    c.to_string(),
                    left.cloned(),
                    &c.operator.to_string(),
                    c.value.clone(),
                    result,
                );
                (result, trace)
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}
