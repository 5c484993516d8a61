//! Integration tests for authrule-runtime
//!
//! Exercises the engine through its public API: template and DSL rules side
//! by side, factory determinism and concurrent evaluation during mutations.

use authrule_core::{
    Account, Card, CardType, Condition, ConditionNode, Operator, Rule, RuleAction, RuleDefinition,
    Transaction, TransactionContext, Value,
};
use authrule_runtime::{codes, RuleEngine, RuleFactory, TemplateRuleFactory};
use chrono::{TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Arc;

fn context(amount: f64, country: &str, card_type: CardType, hour: u32) -> TransactionContext {
    TransactionContext::new(
        Transaction::purchase(amount, "EUR", "MERCH_42", "5999").with_country(country),
        Card::new("520000******0007", "0931", card_type),
        Account::new("ACC_9", 2500.0, 3000.0, 1500.0),
    )
    .at(Utc.with_ymd_and_hms(2025, 2, 14, hour, 5, 0).unwrap())
}

fn sampled_contexts() -> Vec<TransactionContext> {
    let mut contexts = Vec::new();
    for amount in [0.0, 99.99, 100.0, 100.01, 5000.0] {
        for country in ["FR", "US", "DE"] {
            for hour in [0, 9, 17, 23] {
                contexts.push(context(amount, country, CardType::Debit, hour));
            }
        }
    }
    contexts
}

fn params(json: serde_json::Value) -> HashMap<String, Value> {
    serde_json::from_value(json).unwrap()
}

#[test]
fn test_dsl_and_or_semantics() {
    let and = ConditionNode::all(vec![
        ConditionNode::compare("transaction.amount", Operator::GreaterThan, 100.0),
        ConditionNode::compare("transaction.location.country", Operator::In, vec!["FR"]),
    ]);
    let or = ConditionNode::any(vec![
        ConditionNode::compare("transaction.amount", Operator::GreaterThan, 100.0),
        ConditionNode::compare("transaction.location.country", Operator::In, vec!["FR"]),
    ]);

    let engine = RuleEngine::with_default_factory();
    engine.add_custom_rule(RuleDefinition::dsl("And", and, RuleAction::Review, "00").with_id("AND"));
    engine.add_custom_rule(RuleDefinition::dsl("Or", or, RuleAction::Refer, "01").with_id("OR"));

    let matched_ids = |ctx: &TransactionContext| -> Vec<String> {
        engine.evaluate(ctx).into_iter().map(|m| m.rule_id).collect()
    };

    assert_eq!(matched_ids(&context(150.0, "FR", CardType::Debit, 12)), vec!["AND", "OR"]);
    assert_eq!(matched_ids(&context(150.0, "US", CardType::Debit, 12)), vec!["OR"]);
    assert_eq!(matched_ids(&context(50.0, "FR", CardType::Debit, 12)), vec!["OR"]);
    assert!(matched_ids(&context(50.0, "US", CardType::Debit, 12)).is_empty());
}

#[test]
fn test_dsl_rule_loaded_from_json() {
    let definition: RuleDefinition = serde_json::from_str(
        r#"{
            "id": "DEBIT_ABROAD",
            "name": "Debit card used abroad",
            "condition": {
                "and": [
                    {"field": "card.cardType", "operator": "EQUALS", "value": "DEBIT"},
                    {"field": "transaction.location.country", "operator": "NOT_IN", "value": ["FR", "BE"]}
                ]
            },
            "action": "DENY",
            "responseCode": "62",
            "responseMessage": "Debit card restricted to domestic use",
            "priority": 15,
            "category": "SECURITY"
        }"#,
    )
    .unwrap();

    let engine = RuleEngine::with_default_factory();
    engine.add_custom_rule(definition);

    let denied = engine.decide(&context(20.0, "US", CardType::Debit, 12));
    assert_eq!(denied.decision.response_code, "62");
    assert_eq!(denied.decision.response_message, "Debit card restricted to domestic use");

    assert!(engine.evaluate(&context(20.0, "US", CardType::Credit, 12)).is_empty());
    assert!(engine.evaluate(&context(20.0, "BE", CardType::Debit, 12)).is_empty());
}

#[test]
fn test_factory_builds_are_deterministic() {
    let factory = TemplateRuleFactory::default();
    let cases = vec![
        (codes::AMOUNT_ABOVE, params(serde_json::json!({"threshold": 100}))),
        (codes::AMOUNT_BELOW, params(serde_json::json!({"threshold": "100"}))),
        (codes::COUNTRY_IN, params(serde_json::json!({"countries": ["FR", "DE"]}))),
        (codes::TIME_RANGE, params(serde_json::json!({"startHour": 9, "endHour": 17}))),
        (codes::CARD_TYPE, params(serde_json::json!({"type": "DEBIT"}))),
        ("NOT_A_CODE", HashMap::new()),
    ];

    for (code, params) in cases {
        let first = factory.build(code, &params);
        let second = factory.build(code, &params);
        for ctx in sampled_contexts() {
            assert_eq!(first(&ctx).unwrap(), second(&ctx).unwrap(), "code {}", code);
        }
    }
}

#[test]
fn test_template_and_equivalent_dsl_agree() {
    let factory = TemplateRuleFactory::default();
    let template = factory.build(
        codes::AMOUNT_ABOVE,
        &params(serde_json::json!({"threshold": 100})),
    );
    let dsl = Condition::Dsl(ConditionNode::compare(
        "transaction.amount",
        Operator::GreaterThan,
        100.0,
    ));

    for ctx in sampled_contexts() {
        assert_eq!(
            template(&ctx).unwrap(),
            authrule_runtime::ConditionEvaluator::evaluate(&dsl, &ctx)
        );
    }
}

#[test]
fn test_time_range_uses_reference_offset() {
    // 09:05 UTC is 11:05 at UTC+2
    let utc = TemplateRuleFactory::default();
    let plus_two = TemplateRuleFactory::with_offset_seconds(2 * 3600).unwrap();
    let window = params(serde_json::json!({"startHour": 10, "endHour": 12}));
    let ctx = context(10.0, "FR", CardType::Debit, 9);

    assert!(!utc.build(codes::TIME_RANGE, &window)(&ctx).unwrap());
    assert!(plus_two.build(codes::TIME_RANGE, &window)(&ctx).unwrap());
}

#[test]
fn test_evaluations_run_while_rules_change() {
    let engine = Arc::new(RuleEngine::with_default_factory());
    engine.register_rule(
        Rule::new("APPROVE", "Approve", RuleAction::Approve, "00", Condition::from_fn(|_| true))
            .with_priority(100),
    );

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || {
                for _ in 0..200 {
                    let evaluation = engine.decide(&context(10.0, "FR", CardType::Debit, 12));
                    // Either the approval alone, or the block rule denying first
                    let code = evaluation.decision.response_code.as_str();
                    assert!(code == "00" || code == "05", "unexpected code {}", code);
                }
            })
        })
        .collect();

    for i in 0..50 {
        let id = format!("BLOCK_{}", i);
        engine.add_custom_rule(
            RuleDefinition::template("Block", codes::ALWAYS_TRUE, RuleAction::Deny, "05").with_id(id.clone()),
        );
        engine.delete_rule(&id);
    }

    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(engine.get_all_rules().len(), 1);
}
