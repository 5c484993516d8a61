//! Rule factory
//!
//! Maps rule template codes plus parameters to native predicates. This is the
//! only place where rules created at runtime acquire executable behavior.
//! Building is a pure mapping: parameters are read once and captured by value,
//! so building twice from the same input yields predicates with the same truth
//! table.

use authrule_core::{Predicate, TransactionContext, Value};
use chrono::{FixedOffset, Offset, Timelike, Utc};
use std::collections::HashMap;
use std::sync::Arc;

/// Template codes understood by [`TemplateRuleFactory`]
pub mod codes {
    pub const AMOUNT_ABOVE: &str = "AMOUNT_ABOVE";
    pub const AMOUNT_BELOW: &str = "AMOUNT_BELOW";
    pub const MCC_IN: &str = "MCC_IN";
    pub const MERCHANT_IN: &str = "MERCHANT_IN";
    pub const COUNTRY_IN: &str = "COUNTRY_IN";
    pub const CARD_TYPE: &str = "CARD_TYPE";
    pub const TIME_RANGE: &str = "TIME_RANGE";
    pub const ALWAYS_TRUE: &str = "ALWAYS_TRUE";
    pub const ALWAYS_FALSE: &str = "ALWAYS_FALSE";

    pub const ALL: &[&str] = &[
        AMOUNT_ABOVE,
        AMOUNT_BELOW,
        MCC_IN,
        MERCHANT_IN,
        COUNTRY_IN,
        CARD_TYPE,
        TIME_RANGE,
        ALWAYS_TRUE,
        ALWAYS_FALSE,
    ];
}

/// Builds predicates from template codes
pub trait RuleFactory: Send + Sync {
    /// Build the predicate for `code`; unknown codes yield a constant-false predicate
    fn build(&self, code: &str, params: &HashMap<String, Value>) -> Predicate;

    /// Whether `code` is a known template
    fn supports(&self, code: &str) -> bool;
}

/// Default factory for the built-in template vocabulary.
///
/// `TIME_RANGE` reads the hour of the context timestamp in the factory's
/// reference offset (UTC unless configured otherwise).
#[derive(Debug, Clone)]
pub struct TemplateRuleFactory {
    reference_offset: FixedOffset,
}

impl TemplateRuleFactory {
    pub fn new(reference_offset: FixedOffset) -> Self {
        Self { reference_offset }
    }

    /// Factory evaluating time ranges at `seconds` east of UTC; `None` if out of range
    pub fn with_offset_seconds(seconds: i32) -> Option<Self> {
        FixedOffset::east_opt(seconds).map(Self::new)
    }

    pub fn reference_offset(&self) -> FixedOffset {
        self.reference_offset
    }
}

impl Default for TemplateRuleFactory {
    fn default() -> Self {
        Self::new(Utc.fix())
    }
}

impl RuleFactory for TemplateRuleFactory {
    fn build(&self, code: &str, params: &HashMap<String, Value>) -> Predicate {
        match code {
            codes::AMOUNT_ABOVE => {
                let threshold = number_param(params, "threshold", 0.0);
                predicate(move |ctx| ctx.transaction.amount > threshold)
            }
            codes::AMOUNT_BELOW => {
                let threshold = number_param(params, "threshold", 0.0);
                predicate(move |ctx| ctx.transaction.amount < threshold)
            }
            codes::MCC_IN => {
                let mccs = list_param(params, "mccs");
                predicate(move |ctx| contains_loosely(&mccs, &ctx.transaction.mcc))
            }
            codes::MERCHANT_IN => {
                let merchants = list_param(params, "merchants");
                predicate(move |ctx| contains_loosely(&merchants, &ctx.transaction.merchant_id))
            }
            codes::COUNTRY_IN => {
                let countries = list_param(params, "countries");
                predicate(move |ctx| {
                    ctx.transaction
                        .country()
                        .map(|country| contains_loosely(&countries, country))
                        .unwrap_or(false)
                })
            }
            codes::CARD_TYPE => {
                let card_type = params.get("type").and_then(Value::as_str).map(str::to_string);
                predicate(move |ctx| {
                    card_type.as_deref() == Some(ctx.card.card_type.as_str())
                })
            }
            codes::TIME_RANGE => {
                let start = number_param(params, "startHour", 0.0);
                let end = number_param(params, "endHour", 24.0);
                let offset = self.reference_offset;
                predicate(move |ctx| {
                    let hour = ctx.timestamp.with_timezone(&offset).hour() as f64;
                    hour >= start && hour < end
                })
            }
            codes::ALWAYS_TRUE => predicate(|_| true),
            codes::ALWAYS_FALSE => predicate(|_| false),
            unknown => {
                tracing::warn!("Unknown rule code '{}', rule will never match", unknown);
                predicate(|_| false)
            }
        }
    }

    fn supports(&self, code: &str) -> bool {
        codes::ALL.contains(&code)
    }
}

fn predicate<F>(f: F) -> Predicate
where
    F: Fn(&TransactionContext) -> bool + Send + Sync + 'static,
{
    Arc::new(move |ctx: &TransactionContext| Ok::<bool, anyhow::Error>(f(ctx)))
}

fn number_param(params: &HashMap<String, Value>, key: &str, default: f64) -> f64 {
    params.get(key).and_then(Value::as_number).unwrap_or(default)
}

fn list_param(params: &HashMap<String, Value>, key: &str) -> Vec<Value> {
    match params.get(key) {
        Some(Value::Array(items)) => items.clone(),
        Some(other) => {
            tracing::warn!("Parameter '{}' is not a list ({:?}), treating as empty", key, other);
            Vec::new()
        }
        None => Vec::new(),
    }
}

fn contains_loosely(list: &[Value], needle: &str) -> bool {
    let needle = Value::from(needle);
    list.iter().any(|item| item.loose_eq(&needle))
}
