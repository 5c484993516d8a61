//! Authorization flow through the SDK

mod common;

use authrule_sdk::{
    AuthorizationEngineBuilder, CardStatus, Condition, Rule, RuleAction, RuleDefinition,
};
use common::ctx;

#[tokio::test]
async fn test_approval_carries_auth_code() {
    let engine = AuthorizationEngineBuilder::new().build().await.unwrap();

    let response = engine.authorize(&ctx().amount(25.0).build());

    assert!(response.approved);
    assert_eq!(response.response_code, "00");
    assert_eq!(response.deciding_rule(), Some("DEFAULT_APPROVE"));
    assert_eq!(response.authorization_code.as_ref().map(String::len), Some(6));
    assert!(response.trace.is_none());
}

#[tokio::test]
async fn test_decline_has_no_auth_code() {
    let engine = AuthorizationEngineBuilder::new().build().await.unwrap();

    let response = engine.authorize(&ctx().card(|c| c.status = CardStatus::Stolen).build());

    assert!(!response.approved);
    assert_eq!(response.action, RuleAction::Deny);
    assert_eq!(response.response_code, "43");
    assert_eq!(response.response_message, "Stolen card - pick up");
    assert!(response.authorization_code.is_none());
}

#[tokio::test]
async fn test_request_ids_are_unique() {
    let engine = AuthorizationEngineBuilder::new().build().await.unwrap();
    let context = ctx().build();

    let first = engine.authorize(&context);
    let second = engine.authorize(&context);
    assert_ne!(first.request_id, second.request_id);
    assert_eq!(first.response_code, second.response_code);
}

#[tokio::test]
async fn test_no_rules_fails_closed() {
    let engine = AuthorizationEngineBuilder::new()
        .load_builtin_rules(false)
        .build()
        .await
        .unwrap();

    let response = engine.authorize(&ctx().build());
    assert!(!response.approved);
    assert_eq!(response.response_code, "96");
    assert_eq!(response.response_message, "System error - no rules matched");
    assert!(response.matched_rules.is_empty());
}

#[tokio::test]
async fn test_tracing_config_attaches_trace() {
    let engine = AuthorizationEngineBuilder::new()
        .enable_tracing(true)
        .build()
        .await
        .unwrap();

    let response = engine.authorize(&ctx().amount(2100.0).build());
    assert_eq!(response.response_code, "51");

    let trace = response.trace.expect("trace enabled");
    assert_eq!(trace.short_circuited_by.as_deref(), Some("INSUFFICIENT_FUNDS"));
    assert!(trace.skipped_rules.contains(&"DEFAULT_APPROVE".to_string()));
}

#[tokio::test]
async fn test_extra_rules_join_builtins() {
    let engine = AuthorizationEngineBuilder::new()
        .with_rule(
            Rule::new(
                "BLOCK_MERCHANT_CRYPTO",
                "Crypto exchange block",
                RuleAction::Deny,
                "57",
                Condition::from_fn(|ctx| ctx.transaction.mcc == "6051"),
            )
            .with_priority(45),
        )
        .with_rule_definition(
            RuleDefinition::template("US high value", "AMOUNT_ABOVE", RuleAction::Deny, "59")
                .with_id("US_HIGH_VALUE")
                .with_param("threshold", 500.0)
                .with_priority(35),
        )
        .build()
        .await
        .unwrap();

    assert_eq!(engine.authorize(&ctx().mcc("6051").build()).response_code, "57");
    assert_eq!(engine.authorize(&ctx().amount(800.0).build()).response_code, "59");
    assert_eq!(engine.authorize(&ctx().amount(100.0).build()).response_code, "00");
}

#[tokio::test]
async fn test_metrics_are_recorded() {
    let engine = AuthorizationEngineBuilder::new().build().await.unwrap();

    engine.authorize(&ctx().build());
    engine.authorize(&ctx().card(|c| c.pin_blocked = true).build());

    let metrics = engine.metrics().unwrap();
    assert_eq!(metrics.counters.get("evaluations_total"), Some(&2));
    assert_eq!(metrics.counters.get("decisions_approve"), Some(&1));
    assert_eq!(metrics.counters.get("decisions_deny"), Some(&1));
}

#[tokio::test]
async fn test_concurrent_authorizations() {
    let engine = std::sync::Arc::new(AuthorizationEngineBuilder::new().build().await.unwrap());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = engine.clone();
            tokio::spawn(async move {
                let amount = if i % 2 == 0 { 10.0 } else { 2600.0 };
                engine.authorize(&ctx().amount(amount).build()).response_code
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let code = handle.await.unwrap();
        let expected = if i % 2 == 0 { "00" } else { "61" };
        assert_eq!(code, expected);
    }
}
