//! Common test utilities for SDK integration tests

#![allow(dead_code)]

use authrule_sdk::{Account, Card, CardType, Transaction, TransactionContext};
use chrono::{TimeZone, Utc};

/// Builder for transaction contexts with sensible defaults
pub struct ContextBuilder {
    amount: f64,
    mcc: String,
    country: String,
    card: Card,
    account: Account,
    ecommerce: bool,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self {
            amount: 42.0,
            mcc: "5411".to_string(),
            country: "FR".to_string(),
            card: Card::new("497010******0001", "1229", CardType::Debit),
            account: Account::new("ACC_TEST", 2000.0, 3000.0, 2500.0),
            ecommerce: false,
        }
    }

    pub fn amount(mut self, amount: f64) -> Self {
        self.amount = amount;
        self
    }

    pub fn mcc(mut self, mcc: &str) -> Self {
        self.mcc = mcc.to_string();
        self
    }

    pub fn country(mut self, country: &str) -> Self {
        self.country = country.to_string();
        self
    }

    pub fn ecommerce(mut self) -> Self {
        self.ecommerce = true;
        self
    }

    pub fn card(mut self, update: impl FnOnce(&mut Card)) -> Self {
        update(&mut self.card);
        self
    }

    pub fn account(mut self, update: impl FnOnce(&mut Account)) -> Self {
        update(&mut self.account);
        self
    }

    pub fn build(self) -> TransactionContext {
        TransactionContext::new(
            Transaction::purchase(self.amount, "EUR", "MERCH_TEST", self.mcc)
                .with_country(self.country)
                .with_ecommerce(self.ecommerce),
            self.card,
            self.account,
        )
        .at(Utc.with_ymd_and_hms(2025, 9, 1, 14, 0, 0).unwrap())
    }
}

pub fn ctx() -> ContextBuilder {
    ContextBuilder::new()
}
