//! AuthorizationEngine implementation

use super::types::{AuthorizationResponse, ImportSummary, RuleFilter, RuleUpdate};
use crate::config::EngineConfig;
use crate::error::{Result, SdkError};
use authrule_core::{response_codes, Rule, RuleDefinition, TransactionContext};
use authrule_repository::{RuleSnapshot, RuleStateStore};
use authrule_runtime::{Evaluation, EvaluationTrace, MetricsSnapshot, RuleEngine, RuleFactory, RuleStats};
use chrono::Utc;
use rand::Rng;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use uuid::Uuid;

const AUTH_CODE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Authorization engine
pub struct AuthorizationEngine {
    engine: Arc<RuleEngine>,
    store: Arc<dyn RuleStateStore>,
    config: EngineConfig,
    /// Serializes admin mutations with their persistence
    admin_lock: Mutex<()>,
}

impl AuthorizationEngine {
    pub(crate) fn new(engine: Arc<RuleEngine>, store: Arc<dyn RuleStateStore>, config: EngineConfig) -> Self {
        Self {
            engine,
            store,
            config,
            admin_lock: Mutex::new(()),
        }
    }

    /// The underlying rule engine
    pub fn rule_engine(&self) -> Arc<RuleEngine> {
        Arc::clone(&self.engine)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current metrics, if metrics are enabled
    pub fn metrics(&self) -> Option<MetricsSnapshot> {
        self.engine.metrics().map(|m| m.snapshot())
    }

    // ========== Authorization ==========

    /// Authorize a transaction.
    ///
    /// Never fails: when no rule decides, the response is the fail-closed
    /// DENY with code 96.
    pub fn authorize(&self, context: &TransactionContext) -> AuthorizationResponse {
        if self.config.enable_tracing {
            return self.authorize_with_trace(context);
        }
        let start = Instant::now();
        let evaluation = self.engine.decide(context);
        self.respond(start, evaluation, None)
    }

    /// Authorize and attach the evaluation trace
    pub fn authorize_with_trace(&self, context: &TransactionContext) -> AuthorizationResponse {
        let start = Instant::now();
        let (evaluation, trace) = self.engine.decide_with_trace(context);
        self.respond(start, evaluation, Some(trace))
    }

    fn respond(
        &self,
        start: Instant,
        evaluation: Evaluation,
        trace: Option<EvaluationTrace>,
    ) -> AuthorizationResponse {
        let decision = evaluation.decision;
        let approved = decision.is_approved();
        let response = AuthorizationResponse {
            request_id: Uuid::new_v4(),
            approved,
            action: decision.action,
            response_code: decision.response_code,
            response_message: decision.response_message,
            authorization_code: approved.then(generate_auth_code),
            matched_rules: evaluation.matched_rules,
            processing_time_ms: start.elapsed().as_millis() as u64,
            timestamp: Utc::now(),
            trace,
        };

        tracing::info!(
            request_id = %response.request_id,
            approved = response.approved,
            response_code = %response.response_code,
            deciding_rule = response.deciding_rule().unwrap_or("-"),
            "Authorization complete"
        );
        response
    }

    // ========== Rule administration ==========

    /// Rules matching `filter`, by ascending priority
    pub fn list_rules(&self, filter: &RuleFilter) -> Vec<Rule> {
        let mut rules: Vec<Rule> = self
            .engine
            .get_all_rules()
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect();
        rules.sort_by_key(|r| r.priority);
        rules
    }

    pub fn get_rule(&self, id: &str) -> Option<Rule> {
        self.engine.get_rule_by_id(id)
    }

    pub fn rule_stats(&self) -> RuleStats {
        self.engine.stats()
    }

    /// Validate, install and persist a rule definition
    pub async fn create_rule(&self, definition: RuleDefinition) -> Result<Rule> {
        self.validate_definition(&definition)?;
        let _guard = self.admin_lock.lock().await;

        if let Some(id) = definition.id.as_deref() {
            if self.engine.get_rule_by_id(id).is_some() {
                return Err(SdkError::DuplicateRule(id.to_string()));
            }
        }

        let rule = self.engine.add_custom_rule(definition);
        self.persist_locked().await?;
        Ok(rule)
    }

    /// Change the enabled flag and/or priority of a rule
    pub async fn update_rule(&self, id: &str, update: RuleUpdate) -> Result<Rule> {
        let _guard = self.admin_lock.lock().await;

        if self.engine.get_rule_by_id(id).is_none() {
            return Err(SdkError::RuleNotFound(id.to_string()));
        }
        if let Some(enabled) = update.enabled {
            self.engine.set_rule_enabled(id, enabled);
        }
        if let Some(priority) = update.priority {
            self.engine.set_rule_priority(id, priority);
        }
        if !update.is_empty() {
            self.persist_locked().await?;
        }

        self.engine
            .get_rule_by_id(id)
            .ok_or_else(|| SdkError::RuleNotFound(id.to_string()))
    }

    pub async fn delete_rule(&self, id: &str) -> Result<()> {
        let _guard = self.admin_lock.lock().await;

        if !self.engine.delete_rule(id) {
            return Err(SdkError::RuleNotFound(id.to_string()));
        }
        self.persist_locked().await
    }

    /// Install a batch of definitions, replacing rules with the same id.
    ///
    /// The whole batch is validated before anything is installed.
    pub async fn import_rules(&self, definitions: Vec<RuleDefinition>) -> Result<ImportSummary> {
        for definition in &definitions {
            self.validate_definition(definition)?;
        }
        let _guard = self.admin_lock.lock().await;

        let mut summary = ImportSummary::default();
        for definition in definitions {
            if let Some(id) = definition.id.as_deref() {
                if self.engine.delete_rule(id) {
                    summary.replaced += 1;
                }
            }
            self.engine.add_custom_rule(definition);
            summary.imported += 1;
        }

        tracing::info!(
            imported = summary.imported,
            replaced = summary.replaced,
            "Imported rule definitions"
        );
        self.persist_locked().await?;
        Ok(summary)
    }

    /// Write the current administrative state to the store
    pub async fn persist(&self) -> Result<()> {
        let _guard = self.admin_lock.lock().await;
        self.persist_locked().await
    }

    async fn persist_locked(&self) -> Result<()> {
        let snapshot =
            RuleSnapshot::new(self.engine.override_states(), self.engine.custom_definitions()).stamped();
        if let Err(e) = self.store.save(&snapshot).await {
            tracing::error!("Failed to persist rule state to {}: {}", self.store.location(), e);
            return Err(e.into());
        }
        Ok(())
    }

    /// Re-apply the stored state on top of the rules registered at boot.
    ///
    /// Stored custom rules replace boot rules with the same id. Stored
    /// definitions that no longer validate are skipped with a warning.
    pub(crate) async fn restore(&self) -> Result<()> {
        let snapshot = self.store.load().await?;
        let _guard = self.admin_lock.lock().await;

        let mut restored = 0;
        for definition in snapshot.custom_rules {
            if let Err(e) = validate_rule_definition(self.engine.factory().as_ref(), &definition) {
                tracing::warn!("Skipping stored rule from {}: {}", self.store.location(), e);
                continue;
            }
            if let Some(id) = definition.id.as_deref() {
                self.engine.delete_rule(id);
            }
            self.engine.add_custom_rule(definition);
            restored += 1;
        }
        let applied = self.engine.apply_rule_states(&snapshot.overrides);

        tracing::info!(
            custom_rules = restored,
            overrides = applied,
            total_rules = self.engine.stats().total,
            "Restored rule state from {}",
            self.store.location()
        );
        Ok(())
    }

    fn validate_definition(&self, definition: &RuleDefinition) -> Result<()> {
        validate_rule_definition(self.engine.factory().as_ref(), definition)
    }
}

/// Checks applied to every rule definition, whether created at runtime or
/// loaded at boot
pub(crate) fn validate_rule_definition(factory: &dyn RuleFactory, definition: &RuleDefinition) -> Result<()> {
    if definition.name.trim().is_empty() {
        return Err(SdkError::InvalidRule("name is required".to_string()));
    }
    if definition.response_code.trim().is_empty() {
        return Err(SdkError::InvalidRule(format!(
            "rule '{}' has no response code",
            definition.name
        )));
    }
    if definition.condition.is_none() && !factory.supports(&definition.rule_code) {
        return Err(SdkError::InvalidRule(format!(
            "rule '{}' has no condition and unknown rule code '{}'",
            definition.name, definition.rule_code
        )));
    }
    if !response_codes::is_known(&definition.response_code) {
        tracing::warn!(
            "Rule '{}' uses response code {} outside the ISO 8583 table",
            definition.name,
            definition.response_code
        );
    }
    Ok(())
}

fn generate_auth_code() -> String {
    let mut rng = rand::thread_rng();
    (0..6)
        .map(|_| AUTH_CODE_CHARS[rng.gen_range(0..AUTH_CODE_CHARS.len())] as char)
        .collect()
}
