//! Authorization example
//!
//! This example demonstrates:
//! - Booting the engine with the built-in policy set and a rule file
//! - Authorizing a handful of transactions
//! - Reading the collected metrics

use authrule_sdk::{
    Account, AuthorizationEngineBuilder, Card, CardStatus, CardType, Transaction,
    TransactionContext,
};
use tracing_subscriber::EnvFilter;

fn context(label: &str, amount: f64, mcc: &str, country: &str) -> (String, TransactionContext) {
    let ctx = TransactionContext::new(
        Transaction::purchase(amount, "EUR", "MERCH_0042", mcc).with_country(country),
        Card::new("497010******0001", "1229", CardType::Debit),
        Account::new("ACC_0001", 1500.0, 2000.0, 1000.0),
    );
    (label.to_string(), ctx)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== Authorization Example ===\n");

    let engine = AuthorizationEngineBuilder::new()
        .add_rule_file("demos/rules/custom_rules.yaml")
        .enable_metrics(true)
        .build()
        .await?;

    println!("Engine ready with {} rules\n", engine.rule_stats().total);

    let mut scenarios = vec![
        context("Grocery purchase", 42.50, "5411", "FR"),
        context("Casino, abroad", 250.0, "7995", "US"),
        context("Above single limit", 1200.0, "5732", "FR"),
        context("Sanctioned country", 20.0, "5812", "KP"),
    ];
    let (label, mut stolen) = context("Stolen card", 10.0, "5411", "FR");
    stolen.card = stolen.card.with_status(CardStatus::Stolen);
    scenarios.push((label, stolen));

    for (label, ctx) in &scenarios {
        let response = engine.authorize(ctx);
        println!("{}:", label);
        println!("  Approved: {}", response.approved);
        println!("  Response: {} - {}", response.response_code, response.response_message);
        if let Some(code) = &response.authorization_code {
            println!("  Auth code: {}", code);
        }
        let matched: Vec<&str> = response.matched_rules.iter().map(|m| m.rule_id.as_str()).collect();
        println!("  Matched rules: {:?}", matched);
        println!("  Deciding rule: {}", response.deciding_rule().unwrap_or("-"));
        println!();
    }

    if let Some(metrics) = engine.metrics() {
        println!("Metrics:");
        for (name, value) in &metrics.counters {
            println!("  {}: {}", name, value);
        }
        for (name, summary) in &metrics.histograms {
            println!("  {}: count={} avg={:.3}ms p95={:.3}ms", name, summary.count, summary.avg, summary.p95);
        }
    }

    Ok(())
}
