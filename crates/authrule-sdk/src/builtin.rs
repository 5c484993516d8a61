//! Built-in card policy rules
//!
//! Native rules registered at boot. They live in code, so a restart restores
//! them; only their enabled flag and priority are persisted.

use authrule_core::{
    AccountStatus, CardStatus, Condition, Rule, RuleAction, RuleCategory, TransactionContext,
    TransactionType,
};

/// Merchant categories that trigger a manual review
/// (gambling, adult content, crypto, money transfer)
pub const HIGH_RISK_MCCS: &[&str] = &["7995", "5816", "5967", "6051", "6211", "4829"];

pub mod ids {
    pub const STOLEN_CARD: &str = "STOLEN_CARD";
    pub const LOST_CARD: &str = "LOST_CARD";
    pub const CARD_BLOCKED: &str = "CARD_BLOCKED";
    pub const CARD_INACTIVE: &str = "CARD_INACTIVE";
    pub const PIN_BLOCKED: &str = "PIN_BLOCKED";
    pub const EXPIRED_CARD: &str = "EXPIRED_CARD";
    pub const ACCOUNT_NOT_ACTIVE: &str = "ACCOUNT_NOT_ACTIVE";
    pub const SINGLE_TXN_LIMIT: &str = "SINGLE_TXN_LIMIT";
    pub const DAILY_LIMIT: &str = "DAILY_LIMIT";
    pub const INSUFFICIENT_FUNDS: &str = "INSUFFICIENT_FUNDS";
    pub const ECOMMERCE_DISABLED: &str = "ECOMMERCE_DISABLED";
    pub const INTERNATIONAL_DISABLED: &str = "INTERNATIONAL_DISABLED";
    pub const HIGH_RISK_MCC: &str = "HIGH_RISK_MCC";
    pub const DEFAULT_APPROVE: &str = "DEFAULT_APPROVE";
}

/// Transactions that move money out of the account
fn is_debit(ctx: &TransactionContext) -> bool {
    matches!(
        ctx.transaction.transaction_type,
        TransactionType::Purchase | TransactionType::CashAdvance | TransactionType::Transfer
    )
}

fn card_status(id: &str, name: &str, status: CardStatus, code: &str, message: &str, priority: i32) -> Rule {
    Rule::new(
        id,
        name,
        RuleAction::Deny,
        code,
        Condition::from_fn(move |ctx| ctx.card.status == status),
    )
    .with_priority(priority)
    .with_category(RuleCategory::CardStatus)
    .with_message(message)
}

/// The built-in policy set, for an issuer located in `issuer_country`
pub fn builtin_rules(issuer_country: &str) -> Vec<Rule> {
    let home = issuer_country.to_ascii_uppercase();

    vec![
        card_status(ids::STOLEN_CARD, "Stolen card", CardStatus::Stolen, "43", "Stolen card - pick up", 1)
            .with_description("Deny any use of a card reported stolen"),
        card_status(ids::LOST_CARD, "Lost card", CardStatus::Lost, "41", "Lost card - pick up", 2)
            .with_description("Deny any use of a card reported lost"),
        card_status(ids::CARD_BLOCKED, "Blocked card", CardStatus::Blocked, "62", "Restricted card", 3)
            .with_description("Deny transactions on blocked cards"),
        Rule::new(
            ids::CARD_INACTIVE,
            "Inactive card",
            RuleAction::Deny,
            "05",
            Condition::from_fn(|ctx| {
                matches!(ctx.card.status, CardStatus::Inactive | CardStatus::PendingActivation)
            }),
        )
        .with_priority(4)
        .with_category(RuleCategory::CardStatus)
        .with_description("Deny transactions on cards that are not activated")
        .with_message("Do not honor - card not active"),
        Rule::new(
            ids::PIN_BLOCKED,
            "PIN blocked",
            RuleAction::Deny,
            "75",
            Condition::from_fn(|ctx| ctx.card.pin_blocked),
        )
        .with_priority(5)
        .with_category(RuleCategory::Security)
        .with_description("Deny when the PIN try counter is exhausted")
        .with_message("PIN tries exceeded"),
        Rule::new(
            ids::EXPIRED_CARD,
            "Expired card",
            RuleAction::Deny,
            "54",
            Condition::from_fn(|ctx| {
                ctx.card.status == CardStatus::Expired || ctx.card.is_expired_at(ctx.timestamp)
            }),
        )
        .with_priority(6)
        .with_category(RuleCategory::CardStatus)
        .with_description("Deny cards past their expiry month")
        .with_message("Expired card"),
        Rule::new(
            ids::ACCOUNT_NOT_ACTIVE,
            "Account not active",
            RuleAction::Deny,
            "62",
            Condition::from_fn(|ctx| ctx.account.status != AccountStatus::Active),
        )
        .with_priority(10)
        .with_category(RuleCategory::Balance)
        .with_description("Deny when the linked account is not active")
        .with_message("Restricted card - account not active"),
        Rule::new(
            ids::SINGLE_TXN_LIMIT,
            "Single transaction limit",
            RuleAction::Deny,
            "61",
            Condition::from_fn(|ctx| is_debit(ctx) && ctx.transaction.amount > ctx.account.single_txn_limit),
        )
        .with_priority(20)
        .with_category(RuleCategory::Limits)
        .with_description("Deny amounts above the per-transaction limit")
        .with_message("Exceeds single transaction limit"),
        Rule::new(
            ids::DAILY_LIMIT,
            "Daily limit",
            RuleAction::Deny,
            "61",
            Condition::from_fn(|ctx| {
                is_debit(ctx) && ctx.account.daily_spent + ctx.transaction.amount > ctx.account.daily_limit
            }),
        )
        .with_priority(21)
        .with_category(RuleCategory::Limits)
        .with_description("Deny when the day's spending would exceed the daily limit")
        .with_message("Exceeds daily limit"),
        Rule::new(
            ids::INSUFFICIENT_FUNDS,
            "Insufficient funds",
            RuleAction::Deny,
            "51",
            Condition::from_fn(|ctx| is_debit(ctx) && ctx.transaction.amount > ctx.account.spendable()),
        )
        .with_priority(30)
        .with_category(RuleCategory::Balance)
        .with_description("Deny when the amount exceeds the balance plus overdraft")
        .with_message("Insufficient funds"),
        Rule::new(
            ids::ECOMMERCE_DISABLED,
            "E-commerce disabled",
            RuleAction::Deny,
            "57",
            Condition::from_fn(|ctx| ctx.transaction.is_ecommerce && !ctx.card.ecommerce_enabled),
        )
        .with_priority(40)
        .with_category(RuleCategory::Security)
        .with_description("Deny card-not-present use when e-commerce is switched off")
        .with_message("Transaction not permitted - e-commerce disabled"),
        Rule::new(
            ids::INTERNATIONAL_DISABLED,
            "International disabled",
            RuleAction::Deny,
            "62",
            Condition::from_fn(move |ctx| {
                !ctx.card.international_enabled
                    && ctx
                        .transaction
                        .country()
                        .map(|country| !country.eq_ignore_ascii_case(&home))
                        .unwrap_or(false)
            }),
        )
        .with_priority(41)
        .with_category(RuleCategory::Security)
        .with_description("Deny foreign use when international usage is switched off")
        .with_message("Restricted card - international usage disabled"),
        Rule::new(
            ids::HIGH_RISK_MCC,
            "High-risk merchant category",
            RuleAction::Review,
            "00",
            Condition::from_fn(|ctx| HIGH_RISK_MCCS.contains(&ctx.transaction.mcc.as_str())),
        )
        .with_priority(50)
        .with_category(RuleCategory::Fraud)
        .with_description("Flag gambling, adult, crypto and money transfer merchants")
        .with_message("Approved - flagged for review"),
        Rule::new(
            ids::DEFAULT_APPROVE,
            "Default approval",
            RuleAction::Approve,
            "00",
            Condition::from_fn(|_| true),
        )
        .with_priority(1000)
        .with_description("Approve when no denial applies")
        .with_message("Approved"),
    ]
}
