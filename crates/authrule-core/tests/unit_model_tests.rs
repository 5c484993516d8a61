//! Unit tests for the rule model
//!
//! Covers rule definition documents, the transaction context shape that
//! condition paths address, and the response code table.

use authrule_core::*;
use chrono::{TimeZone, Utc};
use std::str::FromStr;

// =============================================================================
// Rule definition documents
// =============================================================================

#[test]
fn test_definition_yaml_with_template() {
    let yaml = r#"
id: TINY_AMOUNTS
name: Card testing
ruleCode: AMOUNT_BELOW
parameters:
  threshold: 1
action: DENY
responseCode: "59"
category: FRAUD
"#;
    let def: RuleDefinition = serde_yaml::from_str(yaml).unwrap();

    assert_eq!(def.id.as_deref(), Some("TINY_AMOUNTS"));
    assert_eq!(def.rule_code, "AMOUNT_BELOW");
    assert_eq!(def.parameters.get("threshold"), Some(&Value::Number(1.0)));
    assert_eq!(def.action, RuleAction::Deny);
    assert_eq!(def.category, RuleCategory::Fraud);
    // Defaults
    assert_eq!(def.priority, 100);
    assert!(def.enabled);
    assert!(def.condition.is_none());
    assert!(def.response_message.is_empty());
}

#[test]
fn test_definition_yaml_with_condition() {
    let yaml = r#"
name: Foreign prepaid
condition:
  and:
    - field: card.cardType
      operator: EQUALS
      value: PREPAID
    - field: transaction.location.country
      operator: NOT_IN
      value: [FR, BE]
action: REVIEW
responseCode: "00"
priority: 55
"#;
    let def: RuleDefinition = serde_yaml::from_str(yaml).unwrap();

    assert!(def.id.is_none());
    assert_eq!(def.priority, 55);
    let condition = def.condition.expect("condition");
    let leaves = condition.comparisons();
    assert_eq!(leaves.len(), 2);
    assert_eq!(leaves[0].field, "card.cardType");
    assert_eq!(leaves[1].operator, Operator::NotIn);
}

#[test]
fn test_definition_json_round_trip_keeps_camel_case() {
    let def = RuleDefinition::template("Big ticket", "AMOUNT_ABOVE", RuleAction::Deny, "61")
        .with_id("BIG_TICKET")
        .with_param("threshold", 5000.0)
        .with_priority(12);

    let json = serde_json::to_value(&def).unwrap();
    assert_eq!(json["ruleCode"], "AMOUNT_ABOVE");
    assert_eq!(json["responseCode"], "61");
    assert!(json.get("condition").is_none());

    let back: RuleDefinition = serde_json::from_value(json).unwrap();
    assert_eq!(back, def);
}

#[test]
fn test_current_definition_reflects_live_state() {
    let def = RuleDefinition::template("Always", "ALWAYS_TRUE", RuleAction::Approve, "00");
    let mut rule = Rule::new("CUSTOM_1", "Always", RuleAction::Approve, "00", Condition::from_fn(|_| true));
    rule.definition = Some(def);
    rule.priority = 7;
    rule.enabled = false;

    let current = rule.current_definition().unwrap();
    assert_eq!(current.id.as_deref(), Some("CUSTOM_1"));
    assert_eq!(current.priority, 7);
    assert!(!current.enabled);
    assert_eq!(rule.state(), RuleState { id: "CUSTOM_1".to_string(), priority: 7, enabled: false });
}

#[test]
fn test_action_and_category_parse_case_insensitive() {
    assert_eq!(RuleAction::from_str("deny").unwrap(), RuleAction::Deny);
    assert_eq!(RuleCategory::from_str("card_status").unwrap(), RuleCategory::CardStatus);
    assert!(matches!(RuleAction::from_str("BLOCK"), Err(CoreError::UnknownAction(_))));
}

// =============================================================================
// Transaction context
// =============================================================================

#[test]
fn test_context_document_exposes_condition_paths() {
    let ctx = TransactionContext::new(
        Transaction::purchase(75.0, "EUR", "MERCH_9", "5812")
            .with_country("DE")
            .with_ecommerce(true),
        Card::new("520000******0007", "0930", CardType::Prepaid),
        Account::new("ACC_9", 300.0, 1000.0, 500.0),
    )
    .at(Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap())
    .with_metadata("channel", "app");

    let json = serde_json::to_value(&ctx).unwrap();
    assert_eq!(json["transaction"]["amount"], 75.0);
    assert_eq!(json["transaction"]["location"]["country"], "DE");
    assert_eq!(json["transaction"]["isEcommerce"], true);
    assert_eq!(json["card"]["cardType"], "PREPAID");
    assert_eq!(json["account"]["availableBalance"], 300.0);
    assert_eq!(json["metadata"]["channel"], "app");
    assert!(json.get("history").is_none());

    assert!(matches!(ctx.to_value().unwrap(), Value::Object(_)));
}

#[test]
fn test_card_expiry() {
    let card = Card::new("411111******1111", "0325", CardType::Debit);

    assert!(!card.is_expired_at(Utc.with_ymd_and_hms(2025, 3, 31, 23, 0, 0).unwrap()));
    assert!(card.is_expired_at(Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap()));
}

#[test]
fn test_spendable_includes_overdraft_only_when_allowed() {
    let mut account = Account::new("ACC_1", 100.0, 1000.0, 500.0);
    account.overdraft_limit = 50.0;
    assert_eq!(account.spendable(), 100.0);

    account.overdraft_allowed = true;
    assert_eq!(account.spendable(), 150.0);
}

// =============================================================================
// Response codes
// =============================================================================

#[test]
fn test_response_codes() {
    assert_eq!(response_codes::describe("51"), Some("Insufficient funds"));
    assert_eq!(response_codes::describe(response_codes::SYSTEM_MALFUNCTION), Some("System malfunction"));
    assert!(response_codes::is_known("00"));
    assert!(!response_codes::is_known("XX"));
}
