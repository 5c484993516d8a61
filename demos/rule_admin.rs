//! Rule administration example
//!
//! This example demonstrates:
//! - Creating, updating and deleting rules at runtime
//! - Bulk import of rule definitions
//! - Persisting changes and restoring them after a restart

use authrule_sdk::{
    AuthorizationEngineBuilder, RuleAction, RuleCategory, RuleDefinition, RuleFilter, RuleUpdate,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== Rule Administration Example ===\n");

    let state_file = std::env::temp_dir().join("authrule-demo-state.json");
    if state_file.exists() {
        std::fs::remove_file(&state_file)?;
    }

    let engine = AuthorizationEngineBuilder::new()
        .with_state_file(&state_file)
        .build()
        .await?;

    // Create a template rule
    let rule = engine
        .create_rule(
            RuleDefinition::template("Large online purchase", "AMOUNT_ABOVE", RuleAction::Deny, "61")
                .with_param("threshold", 750.0)
                .with_priority(15)
                .with_category(RuleCategory::Limits)
                .with_message("Amount above online limit"),
        )
        .await?;
    println!("Created rule {} ({})", rule.id, rule.name);

    // Disable a built-in rule and move another one
    engine.update_rule("HIGH_RISK_MCC", RuleUpdate::enabled(false)).await?;
    engine.update_rule("EXPIRED_CARD", RuleUpdate::priority(2)).await?;

    // Import a batch
    let batch: Vec<RuleDefinition> = serde_json::from_str(
        r#"[
            {"id": "US_MERCHANTS", "name": "US merchants", "ruleCode": "COUNTRY_IN",
             "parameters": {"countries": ["US"]}, "action": "REVIEW", "responseCode": "00",
             "priority": 70, "category": "FRAUD"},
            {"id": "TINY_AMOUNTS", "name": "Card testing", "ruleCode": "AMOUNT_BELOW",
             "parameters": {"threshold": 1}, "action": "DENY", "responseCode": "59",
             "priority": 9, "category": "FRAUD"}
        ]"#,
    )?;
    let summary = engine.import_rules(batch).await?;
    println!("Imported {} rules ({} replaced)", summary.imported, summary.replaced);

    println!("\nFraud rules:");
    for rule in engine.list_rules(&RuleFilter::new().category(RuleCategory::Fraud)) {
        println!("  [{:>4}] {} enabled={}", rule.priority, rule.id, rule.enabled);
    }

    let stats = engine.rule_stats();
    println!("\nStats: total={} enabled={} by category={:?}", stats.total, stats.enabled, stats.by_category);

    // Restart from the persisted state
    drop(engine);
    let restarted = AuthorizationEngineBuilder::new()
        .with_state_file(&state_file)
        .build()
        .await?;

    println!("\nAfter restart:");
    for id in [rule.id.as_str(), "HIGH_RISK_MCC", "EXPIRED_CARD", "TINY_AMOUNTS"] {
        match restarted.get_rule(id) {
            Some(r) => println!("  {} priority={} enabled={}", r.id, r.priority, r.enabled),
            None => println!("  {} missing", id),
        }
    }

    restarted.delete_rule("US_MERCHANTS").await?;
    println!("\nState file: {}", state_file.display());
    Ok(())
}
