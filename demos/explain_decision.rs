//! Explainable decision example
//!
//! Evaluates one transaction against DSL rules and prints the evaluation
//! trace as JSON: every evaluated rule, the resolved field values of each
//! comparison, and the rules skipped after a denial.

use authrule_runtime::RuleEngine;
use authrule_sdk::{
    Account, Card, CardType, ConditionNode, Operator, RuleAction, RuleDefinition, Transaction,
    TransactionContext,
};
use chrono::{TimeZone, Utc};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let engine = RuleEngine::with_default_factory();
    engine.add_custom_rule(
        RuleDefinition::dsl(
            "Foreign high value",
            ConditionNode::all(vec![
                ConditionNode::compare("transaction.amount", Operator::GreaterThan, 1000.0),
                ConditionNode::compare("transaction.location.country", Operator::NotIn, vec!["FR", "BE", "LU"]),
            ]),
            RuleAction::Deny,
            "59",
        )
        .with_id("FOREIGN_HIGH_VALUE")
        .with_priority(10)
        .with_message("Suspected fraud"),
    );
    engine.add_custom_rule(
        RuleDefinition::template("Night window", "TIME_RANGE", RuleAction::Review, "00")
            .with_id("NIGHT_WINDOW")
            .with_param("startHour", 0.0)
            .with_param("endHour", 6.0)
            .with_priority(5),
    );
    engine.add_custom_rule(
        RuleDefinition::template("Default approval", "ALWAYS_TRUE", RuleAction::Approve, "00")
            .with_id("DEFAULT_APPROVE")
            .with_priority(1000),
    );

    let context = TransactionContext::new(
        Transaction::purchase(5000.0, "EUR", "MERCH_7", "7995").with_country("US"),
        Card::new("520000******0007", "0930", CardType::Credit),
        Account::new("ACC_7", 8000.0, 10000.0, 6000.0),
    )
    .at(Utc.with_ymd_and_hms(2025, 11, 3, 2, 15, 0).single().ok_or_else(|| anyhow::anyhow!("invalid timestamp"))?);

    let (evaluation, trace) = engine.decide_with_trace(&context);

    println!("Decision: {}", serde_json::to_string_pretty(&evaluation)?);
    println!("Trace: {}", serde_json::to_string_pretty(&trace)?);
    Ok(())
}
