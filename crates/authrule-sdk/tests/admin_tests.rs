//! Rule administration and persistence through the SDK

mod common;

use authrule_sdk::{
    AuthorizationEngineBuilder, ConditionNode, MemoryRuleStateStore, Operator, RuleAction,
    RuleCategory, RuleDefinition, RuleFilter, RuleStateStore, RuleUpdate, SdkError,
};
use common::ctx;
use std::sync::Arc;
use tempfile::TempDir;

fn large_amount_rule(id: &str, threshold: f64) -> RuleDefinition {
    RuleDefinition::template("Large amount", "AMOUNT_ABOVE", RuleAction::Deny, "61")
        .with_id(id)
        .with_param("threshold", threshold)
        .with_priority(15)
        .with_category(RuleCategory::Limits)
        .with_message("Amount above custom limit")
}

#[tokio::test]
async fn test_create_update_delete_cycle() {
    let store = Arc::new(MemoryRuleStateStore::new());
    let engine = AuthorizationEngineBuilder::new()
        .with_store(store.clone())
        .build()
        .await
        .unwrap();

    let rule = engine.create_rule(large_amount_rule("CUSTOM_LARGE", 300.0)).await.unwrap();
    assert_eq!(rule.id, "CUSTOM_LARGE");
    assert_eq!(engine.authorize(&ctx().amount(400.0).build()).response_code, "61");

    let updated = engine
        .update_rule("CUSTOM_LARGE", RuleUpdate::enabled(false))
        .await
        .unwrap();
    assert!(!updated.enabled);
    assert_eq!(engine.authorize(&ctx().amount(400.0).build()).response_code, "00");

    engine.delete_rule("CUSTOM_LARGE").await.unwrap();
    assert!(engine.get_rule("CUSTOM_LARGE").is_none());
    assert_eq!(store.save_count().await, 3);
}

#[tokio::test]
async fn test_generated_ids() {
    let engine = AuthorizationEngineBuilder::new().build().await.unwrap();

    let rule = engine
        .create_rule(RuleDefinition::template("Night", "TIME_RANGE", RuleAction::Review, "00"))
        .await
        .unwrap();
    assert!(rule.id.starts_with("CUSTOM_"));
    assert!(engine.get_rule(&rule.id).is_some());
}

#[tokio::test]
async fn test_admin_errors() {
    let engine = AuthorizationEngineBuilder::new().build().await.unwrap();

    assert!(matches!(
        engine.update_rule("MISSING", RuleUpdate::priority(1)).await,
        Err(SdkError::RuleNotFound(_))
    ));
    assert!(matches!(
        engine.delete_rule("MISSING").await,
        Err(SdkError::RuleNotFound(_))
    ));
    assert!(matches!(
        engine.create_rule(large_amount_rule("STOLEN_CARD", 1.0)).await,
        Err(SdkError::DuplicateRule(_))
    ));
    assert!(matches!(
        engine
            .create_rule(RuleDefinition::template("Bad", "NO_SUCH_CODE", RuleAction::Deny, "05"))
            .await,
        Err(SdkError::InvalidRule(_))
    ));
    assert!(matches!(
        engine
            .create_rule(RuleDefinition::template(" ", "ALWAYS_TRUE", RuleAction::Deny, "05"))
            .await,
        Err(SdkError::InvalidRule(_))
    ));
}

#[tokio::test]
async fn test_list_rules_with_filters() {
    let engine = AuthorizationEngineBuilder::new().build().await.unwrap();
    engine
        .update_rule("DAILY_LIMIT", RuleUpdate::enabled(false))
        .await
        .unwrap();

    let card_rules = engine.list_rules(&RuleFilter::new().category(RuleCategory::CardStatus));
    assert!(card_rules.iter().all(|r| r.category == RuleCategory::CardStatus));
    assert_eq!(card_rules.first().map(|r| r.id.as_str()), Some("STOLEN_CARD"));

    let disabled = engine.list_rules(&RuleFilter::new().enabled(false));
    let ids: Vec<_> = disabled.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["DAILY_LIMIT"]);

    let all = engine.list_rules(&RuleFilter::new());
    assert!(all.windows(2).all(|w| w[0].priority <= w[1].priority));
}

#[tokio::test]
async fn test_import_replaces_by_id() {
    let engine = AuthorizationEngineBuilder::new()
        .load_builtin_rules(false)
        .build()
        .await
        .unwrap();
    engine.create_rule(large_amount_rule("LIMIT", 1000.0)).await.unwrap();

    let summary = engine
        .import_rules(vec![
            large_amount_rule("LIMIT", 100.0),
            RuleDefinition::dsl(
                "Approve domestic",
                ConditionNode::compare("transaction.location.country", Operator::Equals, "FR"),
                RuleAction::Approve,
                "00",
            )
            .with_id("DOMESTIC"),
        ])
        .await
        .unwrap();

    assert_eq!(summary.imported, 2);
    assert_eq!(summary.replaced, 1);
    assert_eq!(engine.rule_stats().total, 2);
    assert_eq!(engine.authorize(&ctx().amount(150.0).build()).response_code, "61");
    assert_eq!(engine.authorize(&ctx().amount(50.0).build()).response_code, "00");
    assert_eq!(engine.authorize(&ctx().amount(50.0).country("US").build()).response_code, "96");
}

#[tokio::test]
async fn test_import_is_validated_as_a_whole() {
    let engine = AuthorizationEngineBuilder::new()
        .load_builtin_rules(false)
        .build()
        .await
        .unwrap();

    let result = engine
        .import_rules(vec![
            large_amount_rule("OK", 10.0),
            RuleDefinition::template("Broken", "", RuleAction::Deny, "05"),
        ])
        .await;

    assert!(matches!(result, Err(SdkError::InvalidRule(_))));
    assert_eq!(engine.rule_stats().total, 0);
}

#[tokio::test]
async fn test_rule_stats() {
    let engine = AuthorizationEngineBuilder::new().build().await.unwrap();
    engine
        .update_rule("HIGH_RISK_MCC", RuleUpdate::enabled(false))
        .await
        .unwrap();

    let stats = engine.rule_stats();
    assert_eq!(stats.enabled, stats.total - 1);
    assert_eq!(stats.by_category.get("CARD_STATUS"), Some(&5));
    assert_eq!(stats.by_category.get("LIMITS"), Some(&2));
}

#[tokio::test]
async fn test_state_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let state_file = temp_dir.path().join("rule-state.json");

    {
        let engine = AuthorizationEngineBuilder::new()
            .with_state_file(&state_file)
            .build()
            .await
            .unwrap();
        engine
            .update_rule("INSUFFICIENT_FUNDS", RuleUpdate { enabled: Some(false), priority: Some(7) })
            .await
            .unwrap();
        engine.create_rule(large_amount_rule("CUSTOM_LARGE", 300.0)).await.unwrap();
        engine
            .update_rule("CUSTOM_LARGE", RuleUpdate::priority(16))
            .await
            .unwrap();
    }

    let restarted = AuthorizationEngineBuilder::new()
        .with_state_file(&state_file)
        .build()
        .await
        .unwrap();

    let funds = restarted.get_rule("INSUFFICIENT_FUNDS").unwrap();
    assert!(!funds.enabled);
    assert_eq!(funds.priority, 7);

    let custom = restarted.get_rule("CUSTOM_LARGE").unwrap();
    assert_eq!(custom.priority, 16);
    assert_eq!(restarted.authorize(&ctx().amount(400.0).build()).response_code, "61");

    // Funds check is off, so an overdrawn purchase under the limits is approved
    let overdrawn = ctx().amount(250.0).account(|a| a.available_balance = 10.0).build();
    assert_eq!(restarted.authorize(&overdrawn).response_code, "00");
}

#[tokio::test]
async fn test_snapshot_separates_overrides_from_custom_rules() {
    let store = Arc::new(MemoryRuleStateStore::new());
    let engine = AuthorizationEngineBuilder::new()
        .with_store(store.clone())
        .build()
        .await
        .unwrap();
    engine.create_rule(large_amount_rule("CUSTOM_LARGE", 300.0)).await.unwrap();

    let snapshot = store.load().await.unwrap();
    assert_eq!(snapshot.custom_rule_ids(), vec!["CUSTOM_LARGE"]);
    assert!(snapshot.overrides.iter().all(|s| s.id != "CUSTOM_LARGE"));
    assert!(snapshot.overrides.iter().any(|s| s.id == "STOLEN_CARD"));
    assert!(snapshot.saved_at.is_some());
}

fn write_limit_file(path: &std::path::Path, threshold: u32, with_id: bool) {
    let id_line = if with_id { "  - id: FILE_LIMIT\n" } else { "  - " };
    let body = format!(
        "rules:\n{}{}name: File limit\n    ruleCode: AMOUNT_ABOVE\n    parameters:\n      threshold: {}\n    action: DENY\n    responseCode: \"61\"\n    priority: 12\n",
        id_line,
        if with_id { "    " } else { "" },
        threshold
    );
    std::fs::write(path, body).unwrap();
}

async fn boot_with_file(rule_file: &std::path::Path, state_file: &std::path::Path) -> authrule_sdk::AuthorizationEngine {
    AuthorizationEngineBuilder::new()
        .load_builtin_rules(false)
        .add_rule_file(rule_file)
        .with_state_file(state_file)
        .build()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_file_rules_are_not_duplicated_across_restarts() {
    let temp_dir = TempDir::new().unwrap();
    let rule_file = temp_dir.path().join("limits.yaml");
    let state_file = temp_dir.path().join("rule-state.json");
    write_limit_file(&rule_file, 1000, false);

    let mut counts = Vec::new();
    for boot in 0..3 {
        let engine = boot_with_file(&rule_file, &state_file).await;
        counts.push(engine.rule_stats().total);

        let rule = engine.get_rule("LIMITS_1").expect("id derived from the file");
        engine
            .update_rule(&rule.id, RuleUpdate::priority(20 + boot))
            .await
            .unwrap();
    }
    assert_eq!(counts, vec![1, 1, 1]);

    let engine = boot_with_file(&rule_file, &state_file).await;
    assert_eq!(engine.rule_stats().total, 1);
    assert_eq!(engine.get_rule("LIMITS_1").unwrap().priority, 22);

    let store = authrule_sdk::FileRuleStateStore::new(&state_file).unwrap();
    let snapshot = store.load().await.unwrap();
    assert!(snapshot.custom_rules.is_empty());
    assert_eq!(snapshot.overrides.len(), 1);
}

#[tokio::test]
async fn test_file_edits_take_effect_after_restart() {
    let temp_dir = TempDir::new().unwrap();
    let rule_file = temp_dir.path().join("limits.yaml");
    let state_file = temp_dir.path().join("rule-state.json");
    write_limit_file(&rule_file, 1000, true);

    {
        let engine = boot_with_file(&rule_file, &state_file).await;
        engine
            .update_rule("FILE_LIMIT", RuleUpdate::enabled(true))
            .await
            .unwrap();
        assert_eq!(engine.authorize(&ctx().amount(50.0).build()).response_code, "96");
    }

    write_limit_file(&rule_file, 10, true);
    let engine = boot_with_file(&rule_file, &state_file).await;

    let rule = engine.get_rule("FILE_LIMIT").unwrap();
    let threshold = rule
        .definition
        .as_ref()
        .and_then(|d| d.parameters.get("threshold").cloned());
    assert_eq!(threshold, Some(authrule_sdk::Value::Number(10.0)));
    assert_eq!(engine.authorize(&ctx().amount(50.0).build()).response_code, "61");
}

#[tokio::test]
async fn test_overrides_of_file_rules_survive_restart() {
    let temp_dir = TempDir::new().unwrap();
    let rule_file = temp_dir.path().join("limits.yaml");
    let state_file = temp_dir.path().join("rule-state.json");
    write_limit_file(&rule_file, 10, true);

    {
        let engine = boot_with_file(&rule_file, &state_file).await;
        engine
            .update_rule("FILE_LIMIT", RuleUpdate::enabled(false))
            .await
            .unwrap();
    }

    let engine = boot_with_file(&rule_file, &state_file).await;
    assert!(!engine.get_rule("FILE_LIMIT").unwrap().enabled);
}

#[tokio::test]
async fn test_invalid_rule_file_fails_boot() {
    let temp_dir = TempDir::new().unwrap();
    let rule_file = temp_dir.path().join("broken.yaml");
    std::fs::write(
        &rule_file,
        "- id: BROKEN\n  name: Broken\n  ruleCode: NOT_A_CODE\n  action: DENY\n  responseCode: \"05\"\n",
    )
    .unwrap();

    let result = AuthorizationEngineBuilder::new()
        .add_rule_file(&rule_file)
        .build()
        .await;

    match result {
        Err(SdkError::InvalidRule(reason)) => assert!(reason.contains("broken.yaml")),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("boot should fail"),
    }
}

#[tokio::test]
async fn test_rule_directory_is_loaded_at_boot() {
    let temp_dir = TempDir::new().unwrap();
    let rules_dir = temp_dir.path().join("rules");
    std::fs::create_dir(&rules_dir).unwrap();
    write_limit_file(&rules_dir.join("limits.yaml"), 500, true);
    std::fs::write(
        rules_dir.join("fraud.yaml"),
        "- name: Sanctioned\n  ruleCode: COUNTRY_IN\n  parameters:\n    countries: [KP]\n  action: DENY\n  responseCode: \"62\"\n  priority: 8\n",
    )
    .unwrap();

    let engine = AuthorizationEngineBuilder::new()
        .add_rule_file(&rules_dir)
        .build()
        .await
        .unwrap();

    assert!(engine.get_rule("FILE_LIMIT").is_some());
    assert!(engine.get_rule("FRAUD_1").is_some());
    assert_eq!(engine.authorize(&ctx().country("KP").build()).response_code, "62");
}

#[tokio::test]
async fn test_stored_rules_that_no_longer_validate_are_skipped() {
    let snapshot = authrule_sdk::RuleSnapshot::new(
        Vec::new(),
        vec![
            RuleDefinition::template("Retired", "RETIRED_CODE", RuleAction::Deny, "05").with_id("RETIRED"),
            large_amount_rule("CUSTOM_LARGE", 300.0),
        ],
    );
    let store = Arc::new(MemoryRuleStateStore::with_snapshot(snapshot));

    let engine = AuthorizationEngineBuilder::new()
        .with_store(store)
        .build()
        .await
        .unwrap();

    assert!(engine.get_rule("RETIRED").is_none());
    assert!(engine.get_rule("CUSTOM_LARGE").is_some());
}
