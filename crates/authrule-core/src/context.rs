//! Transaction context
//!
//! A `TransactionContext` is the read-only snapshot assembled by the caller for
//! one authorization attempt: the transaction itself, the card and account
//! records resolved from the caller's stores, optional history signals and the
//! evaluation instant.
//!
//! The context serializes with camelCase keys, which is the shape condition
//! field paths address (`transaction.amount`, `card.cardType`,
//! `transaction.location.country`).

use crate::error::Result;
use crate::types::Value;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Transaction type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Purchase,
    CashAdvance,
    Refund,
    Void,
    BalanceInquiry,
    Transfer,
}

/// Geographic location of the acceptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// ISO country code
    pub country: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

/// Transaction to be authorized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// System Trace Audit Number
    #[serde(default)]
    pub stan: String,

    /// Amount in currency-major units
    pub amount: f64,

    /// Currency code (EUR, USD, ...)
    pub currency: String,

    #[serde(default = "default_transaction_type")]
    pub transaction_type: TransactionType,

    pub merchant_id: String,

    /// Card acceptor terminal id
    #[serde(default)]
    pub terminal_id: String,

    /// Merchant Category Code
    pub mcc: String,

    /// Point of Service entry mode
    #[serde(default)]
    pub pos_entry_mode: String,

    #[serde(default)]
    pub pin_entered: bool,

    #[serde(default)]
    pub cvv_provided: bool,

    #[serde(default)]
    pub three_ds_authenticated: bool,

    #[serde(default)]
    pub is_ecommerce: bool,

    #[serde(default)]
    pub is_recurring: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

fn default_transaction_type() -> TransactionType {
    TransactionType::Purchase
}

impl Transaction {
    /// Create a purchase with the minimal required fields
    pub fn purchase(
        amount: f64,
        currency: impl Into<String>,
        merchant_id: impl Into<String>,
        mcc: impl Into<String>,
    ) -> Self {
        Self {
            stan: String::new(),
            amount,
            currency: currency.into(),
            transaction_type: TransactionType::Purchase,
            merchant_id: merchant_id.into(),
            terminal_id: String::new(),
            mcc: mcc.into(),
            pos_entry_mode: String::new(),
            pin_entered: false,
            cvv_provided: false,
            three_ds_authenticated: false,
            is_ecommerce: false,
            is_recurring: false,
            location: None,
        }
    }

    /// Set the acceptor country
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.location = Some(Location {
            country: country.into(),
            city: None,
            latitude: None,
            longitude: None,
        });
        self
    }

    /// Mark as card-not-present e-commerce
    pub fn with_ecommerce(mut self, is_ecommerce: bool) -> Self {
        self.is_ecommerce = is_ecommerce;
        self
    }

    /// Acceptor country, if known
    pub fn country(&self) -> Option<&str> {
        self.location.as_ref().map(|l| l.country.as_str())
    }
}

/// Card status as resolved by the card store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardStatus {
    Active,
    Inactive,
    Blocked,
    Expired,
    Stolen,
    Lost,
    PendingActivation,
}

/// Card product type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CardType {
    Debit,
    Credit,
    Prepaid,
}

impl CardType {
    /// Wire name used in rule parameters
    pub fn as_str(&self) -> &'static str {
        match self {
            CardType::Debit => "DEBIT",
            CardType::Credit => "CREDIT",
            CardType::Prepaid => "PREPAID",
        }
    }
}

/// Card information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Masked PAN reference, never the clear PAN
    pub masked_pan: String,

    /// Expiry date (MMYY)
    pub expiry_date: String,

    pub status: CardStatus,

    pub card_type: CardType,

    /// Card network (VISA, MASTERCARD, ...)
    #[serde(default)]
    pub network: String,

    #[serde(default = "default_true")]
    pub ecommerce_enabled: bool,

    #[serde(default = "default_true")]
    pub international_enabled: bool,

    #[serde(default = "default_true")]
    pub contactless_enabled: bool,

    #[serde(default)]
    pub pin_blocked: bool,

    #[serde(default)]
    pub account_id: String,
}

fn default_true() -> bool {
    true
}

impl Card {
    /// Create an active card
    pub fn new(
        masked_pan: impl Into<String>,
        expiry_date: impl Into<String>,
        card_type: CardType,
    ) -> Self {
        Self {
            masked_pan: masked_pan.into(),
            expiry_date: expiry_date.into(),
            status: CardStatus::Active,
            card_type,
            network: String::new(),
            ecommerce_enabled: true,
            international_enabled: true,
            contactless_enabled: true,
            pin_blocked: false,
            account_id: String::new(),
        }
    }

    /// Set the card status
    pub fn with_status(mut self, status: CardStatus) -> Self {
        self.status = status;
        self
    }

    /// Whether the MMYY expiry lies before the month of `at`.
    ///
    /// A card stays valid through the last day of its expiry month. An
    /// unparseable expiry counts as expired.
    pub fn is_expired_at(&self, at: DateTime<Utc>) -> bool {
        use chrono::Datelike;

        let digits = self.expiry_date.trim();
        if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return true;
        }
        let (month, year) = match (digits[0..2].parse::<u32>(), digits[2..4].parse::<i32>()) {
            (Ok(m), Ok(y)) if (1..=12).contains(&m) => (m, 2000 + y),
            _ => return true,
        };

        (year, month) < (at.year(), at.month())
    }
}

/// Account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountStatus {
    Active,
    Inactive,
    Blocked,
    Closed,
}

/// Account information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,

    pub balance: f64,

    /// Balance net of holds
    pub available_balance: f64,

    pub currency: String,

    pub status: AccountStatus,

    pub daily_limit: f64,

    pub single_txn_limit: f64,

    #[serde(default)]
    pub daily_spent: f64,

    #[serde(default)]
    pub daily_txn_count: u32,

    #[serde(default)]
    pub overdraft_allowed: bool,

    #[serde(default)]
    pub overdraft_limit: f64,
}

impl Account {
    /// Create an active account with the given available balance and limits
    pub fn new(
        id: impl Into<String>,
        available_balance: f64,
        daily_limit: f64,
        single_txn_limit: f64,
    ) -> Self {
        Self {
            id: id.into(),
            balance: available_balance,
            available_balance,
            currency: "EUR".to_string(),
            status: AccountStatus::Active,
            daily_limit,
            single_txn_limit,
            daily_spent: 0.0,
            daily_txn_count: 0,
            overdraft_allowed: false,
            overdraft_limit: 0.0,
        }
    }

    /// Funds that can be spent, including the overdraft facility
    pub fn spendable(&self) -> f64 {
        if self.overdraft_allowed {
            self.available_balance + self.overdraft_limit
        } else {
            self.available_balance
        }
    }
}

/// Summary of recent activity for the card
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionHistory {
    pub total_count: u32,

    pub declined_count: u32,

    #[serde(default)]
    pub distinct_countries: Vec<String>,
}

/// Read-only snapshot evaluated by the rule engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionContext {
    pub transaction: Transaction,

    pub card: Card,

    pub account: Account,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<TransactionHistory>,

    /// Instant of evaluation
    pub timestamp: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, Value>,
}

impl TransactionContext {
    /// Create a context evaluated at the current instant
    pub fn new(transaction: Transaction, card: Card, account: Account) -> Self {
        Self {
            transaction,
            card,
            account,
            history: None,
            timestamp: Utc::now(),
            metadata: HashMap::new(),
        }
    }

    /// Pin the evaluation instant
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Attach history signals
    pub fn with_history(mut self, history: TransactionHistory) -> Self {
        self.history = Some(history);
        self
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Serialize into the document that condition field paths address
    pub fn to_value(&self) -> Result<Value> {
        Ok(Value::from(serde_json::to_value(self)?))
    }
}
