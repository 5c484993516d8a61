//! Rule engine
//!
//! Runs the enabled rules in priority order against a transaction context.
//! The first matching DENY decides and stops the pass; otherwise the first
//! matching APPROVE decides. Evaluation never fails: faulting rules count as
//! non-matches and an undecided pass resolves to the fail-closed fallback.

use crate::evaluator::{ConditionEvaluator, ConditionOutcome, EvaluationScope};
use crate::factory::{RuleFactory, TemplateRuleFactory};
use crate::observability::{Metrics, MetricsCollector};
use crate::repository::RuleRepository;
use crate::resolver::DecisionResolver;
use crate::trace::{EvaluationTrace, RuleTrace};
use authrule_core::{
    Condition, Decision, MatchedRule, Rule, RuleAction, RuleDefinition, RuleSource, RuleState,
    TransactionContext,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLockReadGuard, RwLockWriteGuard, RwLock};
use std::time::Instant;
use uuid::Uuid;

/// Outcome of one evaluation pass
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    /// Every matched rule, in evaluation order
    pub matched_rules: Vec<MatchedRule>,
    pub decision: Decision,
}

/// Rule counts for the admin surface
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleStats {
    pub total: usize,
    pub enabled: usize,
    pub by_category: BTreeMap<String, usize>,
}

/// Authorization rule engine.
///
/// Shared behind an `Arc`; evaluations take the read lock on the rule set and
/// may run concurrently with each other.
pub struct RuleEngine {
    rules: RwLock<RuleRepository>,
    factory: Arc<dyn RuleFactory>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl RuleEngine {
    /// Create an empty engine compiling custom rules through `factory`
    pub fn new(factory: Arc<dyn RuleFactory>) -> Self {
        Self {
            rules: RwLock::new(RuleRepository::new()),
            factory,
            metrics: None,
        }
    }

    /// Create an empty engine with the UTC template factory
    pub fn with_default_factory() -> Self {
        Self::new(Arc::new(TemplateRuleFactory::default()))
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn metrics(&self) -> Option<&Arc<MetricsCollector>> {
        self.metrics.as_ref()
    }

    pub fn factory(&self) -> &Arc<dyn RuleFactory> {
        &self.factory
    }

    // ---- rule management ----

    /// Install a fully formed rule
    pub fn register_rule(&self, rule: Rule) {
        tracing::info!(rule_id = %rule.id, priority = rule.priority, "Registering rule {}", rule.name);
        self.write().add(rule);
    }

    /// Build a rule from a definition without installing it.
    ///
    /// A DSL condition takes precedence over the template code. Missing ids
    /// are generated as `CUSTOM_<uuid>`.
    pub fn build_rule(&self, definition: RuleDefinition, source: RuleSource) -> Rule {
        let id = definition
            .id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("CUSTOM_{}", Uuid::new_v4()));

        let condition = match &definition.condition {
            Some(node) => Condition::Dsl(node.clone()),
            None => {
                if !self.factory.supports(&definition.rule_code) {
                    tracing::warn!(
                        rule_id = %id,
                        "Rule code '{}' is not supported, rule will never match",
                        definition.rule_code
                    );
                }
                Condition::Native(self.factory.build(&definition.rule_code, &definition.parameters))
            }
        };

        let mut rule = Rule::new(
            id.clone(),
            definition.name.clone(),
            definition.action,
            definition.response_code.clone(),
            condition,
        )
        .with_description(definition.description.clone())
        .with_message(definition.response_message.clone())
        .with_priority(definition.priority)
        .with_enabled(definition.enabled)
        .with_category(definition.category)
        .with_source(source);

        let mut stored = definition;
        stored.id = Some(id);
        rule.definition = Some(stored);
        rule
    }

    /// Build and install a rule from a definition supplied at boot.
    ///
    /// Boot rules are rebuilt from their source on every start, so only their
    /// overrides are reported by [`rule_states`](Self::rule_states) for
    /// persistence.
    pub fn load_definition(&self, definition: RuleDefinition) -> Rule {
        let rule = self.build_rule(definition, RuleSource::Boot);
        tracing::info!(rule_id = %rule.id, "Loading rule {}", rule.name);
        self.write().add(rule.clone());
        rule
    }

    /// Build and install a rule created through the admin surface
    pub fn add_custom_rule(&self, definition: RuleDefinition) -> Rule {
        let rule = self.build_rule(definition, RuleSource::Admin);
        tracing::info!(rule_id = %rule.id, "Adding custom rule {}", rule.name);
        self.write().add(rule.clone());
        rule
    }

    pub fn delete_rule(&self, id: &str) -> bool {
        let removed = self.write().remove(id);
        if removed {
            tracing::info!(rule_id = %id, "Deleted rule");
        }
        removed
    }

    pub fn set_rule_enabled(&self, id: &str, enabled: bool) -> bool {
        let updated = self.write().set_enabled(id, enabled);
        if updated {
            tracing::info!(rule_id = %id, enabled, "Rule enabled flag changed");
        }
        updated
    }

    pub fn set_rule_priority(&self, id: &str, priority: i32) -> bool {
        let updated = self.write().set_priority(id, priority);
        if updated {
            tracing::info!(rule_id = %id, priority, "Rule priority changed");
        }
        updated
    }

    /// All rules in registration order
    pub fn get_all_rules(&self) -> Vec<Rule> {
        self.read().get_all()
    }

    pub fn get_rule_by_id(&self, id: &str) -> Option<Rule> {
        self.read().get_by_id(id)
    }

    pub fn clear_rules(&self) {
        tracing::info!("Clearing all rules");
        self.write().clear();
    }

    /// Administrative state of every rule
    pub fn rule_states(&self) -> Vec<RuleState> {
        self.read().iter().map(Rule::state).collect()
    }

    /// Definitions of the admin-created rules, with live state
    pub fn custom_definitions(&self) -> Vec<RuleDefinition> {
        self.read()
            .iter()
            .filter(|r| r.is_persistable())
            .filter_map(Rule::current_definition)
            .collect()
    }

    /// Overrides of every rule whose definition is not persisted
    pub fn override_states(&self) -> Vec<RuleState> {
        self.read()
            .iter()
            .filter(|r| !r.is_persistable())
            .map(Rule::state)
            .collect()
    }

    /// Re-apply persisted overrides; returns how many matched a known rule
    pub fn apply_rule_states(&self, states: &[RuleState]) -> usize {
        let mut rules = self.write();
        let mut applied = 0;
        for state in states {
            let known = rules.set_enabled(&state.id, state.enabled);
            if known {
                rules.set_priority(&state.id, state.priority);
                applied += 1;
            } else {
                tracing::debug!(rule_id = %state.id, "Ignoring state for unknown rule");
            }
        }
        applied
    }

    pub fn stats(&self) -> RuleStats {
        let rules = self.read();
        let mut stats = RuleStats::default();
        for rule in rules.iter() {
            stats.total += 1;
            if rule.enabled {
                stats.enabled += 1;
            }
            *stats
                .by_category
                .entry(rule.category.as_str().to_string())
                .or_insert(0) += 1;
        }
        stats
    }

    // ---- evaluation ----

    /// Evaluate the enabled rules and return every match in order
    pub fn evaluate(&self, context: &TransactionContext) -> Vec<MatchedRule> {
        let rules = self.read().get_sorted_enabled();
        self.run_pass(&rules, context, None)
    }

    /// Resolve the decision for a set of matches against the live rule set
    pub fn get_decision(&self, matched: &[MatchedRule]) -> Decision {
        let decision = {
            let rules = self.read();
            DecisionResolver::resolve(matched, |id| {
                rules.find(id).map(|r| r.response_message.clone())
            })
        };
        self.record_decision(matched, &decision);
        decision
    }

    /// Evaluate and resolve against a single snapshot of the rule set
    pub fn decide(&self, context: &TransactionContext) -> Evaluation {
        let rules = self.read().get_sorted_enabled();
        let matched_rules = self.run_pass(&rules, context, None);
        self.resolve_in(&rules, matched_rules)
    }

    /// Like [`decide`](Self::decide), also reporting how each rule resolved
    pub fn decide_with_trace(&self, context: &TransactionContext) -> (Evaluation, EvaluationTrace) {
        let rules = self.read().get_sorted_enabled();
        let mut trace = EvaluationTrace::default();
        let matched_rules = self.run_pass(&rules, context, Some(&mut trace));
        (self.resolve_in(&rules, matched_rules), trace)
    }

    fn resolve_in(&self, rules: &[Rule], matched_rules: Vec<MatchedRule>) -> Evaluation {
        let decision = DecisionResolver::resolve(&matched_rules, |id| {
            rules
                .iter()
                .find(|r| r.id == id)
                .map(|r| r.response_message.clone())
        });
        self.record_decision(&matched_rules, &decision);
        Evaluation {
            matched_rules,
            decision,
        }
    }

    fn run_pass(
        &self,
        rules: &[Rule],
        context: &TransactionContext,
        mut trace: Option<&mut EvaluationTrace>,
    ) -> Vec<MatchedRule> {
        let start = Instant::now();
        let scope = EvaluationScope::new(context);
        let mut matched = Vec::new();
        let mut denied = false;

        for (index, rule) in rules.iter().enumerate() {
            let outcome = match trace.as_deref_mut() {
                Some(trace) => {
                    let (outcome, conditions) =
                        ConditionEvaluator::evaluate_with_trace(&rule.condition, &scope);
                    trace.rules.push(RuleTrace {
                        rule_id: rule.id.clone(),
                        rule_name: rule.name.clone(),
                        priority: rule.priority,
                        action: rule.action,
                        matched: outcome.is_match(),
                        fault: outcome.fault().map(str::to_string),
                        conditions,
                    });
                    outcome
                }
                None => ConditionEvaluator::evaluate_in_scope(&rule.condition, &scope),
            };

            self.report_fault(rule, &outcome);
            if !outcome.is_match() {
                continue;
            }

            tracing::debug!(rule_id = %rule.id, action = %rule.action, "Rule matched");
            let mut hit = MatchedRule::from_rule(rule);

            if rule.action == RuleAction::Deny {
                hit.was_deciding = true;
                matched.push(hit);
                denied = true;
                if let Some(trace) = trace.as_deref_mut() {
                    trace.short_circuited_by = Some(rule.id.clone());
                    trace.skipped_rules = rules[index + 1..].iter().map(|r| r.id.clone()).collect();
                }
                break;
            }
            matched.push(hit);
        }

        if !denied {
            if let Some(approval) = matched.iter_mut().find(|m| m.action == RuleAction::Approve) {
                approval.was_deciding = true;
            }
        }

        if let Some(metrics) = &self.metrics {
            metrics.counter("evaluations_total").inc();
            metrics.record_execution_time("evaluation", start.elapsed());
        }
        tracing::debug!(
            evaluated = rules.len(),
            matched = matched.len(),
            duration_us = start.elapsed().as_micros() as u64,
            "Evaluation pass complete"
        );

        matched
    }

    fn report_fault(&self, rule: &Rule, outcome: &ConditionOutcome) {
        match outcome {
            ConditionOutcome::Faulted(error) => {
                tracing::warn!(rule_id = %rule.id, "Rule condition failed, treating as no match: {}", error);
            }
            ConditionOutcome::Panicked(message) => {
                tracing::error!(rule_id = %rule.id, "Rule condition panicked, treating as no match: {}", message);
            }
            _ => return,
        }
        if let Some(metrics) = &self.metrics {
            metrics.record_error("rule_fault");
        }
    }

    fn record_decision(&self, matched: &[MatchedRule], decision: &Decision) {
        let Some(metrics) = &self.metrics else {
            return;
        };
        metrics
            .counter(&format!("decisions_{}", decision.action.as_str().to_ascii_lowercase()))
            .inc();
        if DecisionResolver::deciding(matched).is_none() {
            metrics.counter("fallback_decisions_total").inc();
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, RuleRepository> {
        self.rules.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RuleRepository> {
        self.rules.write().unwrap_or_else(PoisonError::into_inner)
    }
}
