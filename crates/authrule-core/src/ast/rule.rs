//! Rule definitions

use crate::condition::ConditionNode;
use crate::context::TransactionContext;
use crate::error::CoreError;
use crate::types::Value;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Native condition predicate.
///
/// Returning an error marks the rule as faulted for the current pass; the
/// engine treats it as a non-match and keeps evaluating other rules.
pub type Predicate = Arc<dyn Fn(&TransactionContext) -> anyhow::Result<bool> + Send + Sync>;

/// Action taken when a rule becomes the deciding rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuleAction {
    Approve,
    Deny,
    Review,
    Refer,
}

impl RuleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleAction::Approve => "APPROVE",
            RuleAction::Deny => "DENY",
            RuleAction::Review => "REVIEW",
            RuleAction::Refer => "REFER",
        }
    }
}

impl fmt::Display for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "APPROVE" => Ok(RuleAction::Approve),
            "DENY" => Ok(RuleAction::Deny),
            "REVIEW" => Ok(RuleAction::Review),
            "REFER" => Ok(RuleAction::Refer),
            _ => Err(CoreError::UnknownAction(s.to_string())),
        }
    }
}

/// Rule category, informational grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleCategory {
    Balance,
    CardStatus,
    Limits,
    Fraud,
    Security,
    Velocity,
    #[default]
    Custom,
}

impl RuleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCategory::Balance => "BALANCE",
            RuleCategory::CardStatus => "CARD_STATUS",
            RuleCategory::Limits => "LIMITS",
            RuleCategory::Fraud => "FRAUD",
            RuleCategory::Security => "SECURITY",
            RuleCategory::Velocity => "VELOCITY",
            RuleCategory::Custom => "CUSTOM",
        }
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BALANCE" => Ok(RuleCategory::Balance),
            "CARD_STATUS" => Ok(RuleCategory::CardStatus),
            "LIMITS" => Ok(RuleCategory::Limits),
            "FRAUD" => Ok(RuleCategory::Fraud),
            "SECURITY" => Ok(RuleCategory::Security),
            "VELOCITY" => Ok(RuleCategory::Velocity),
            "CUSTOM" => Ok(RuleCategory::Custom),
            _ => Err(CoreError::UnknownCategory(s.to_string())),
        }
    }
}

/// A rule's condition: native code or a declarative tree
#[derive(Clone)]
pub enum Condition {
    Native(Predicate),
    Dsl(ConditionNode),
}

impl Condition {
    /// Wrap a closure as a native condition
    pub fn native<F>(predicate: F) -> Self
    where
        F: Fn(&TransactionContext) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        Condition::Native(Arc::new(predicate))
    }

    /// Wrap an infallible closure as a native condition
    pub fn from_fn<F>(predicate: F) -> Self
    where
        F: Fn(&TransactionContext) -> bool + Send + Sync + 'static,
    {
        Condition::Native(Arc::new(move |ctx: &TransactionContext| {
            Ok::<bool, anyhow::Error>(predicate(ctx))
        }))
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Native(_) => f.write_str("Native(<predicate>)"),
            Condition::Dsl(node) => f.debug_tuple("Dsl").field(node).finish(),
        }
    }
}

/// Declarative rule definition, as supplied by administrators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDefinition {
    /// Explicit id; generated when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Template code understood by the rule factory (e.g. "AMOUNT_ABOVE")
    #[serde(default)]
    pub rule_code: String,

    /// Template parameters
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub parameters: HashMap<String, Value>,

    /// DSL condition; takes precedence over `rule_code`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ConditionNode>,

    pub action: RuleAction,

    pub response_code: String,

    #[serde(default)]
    pub response_message: String,

    #[serde(default = "default_priority")]
    pub priority: i32,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default)]
    pub category: RuleCategory,
}

fn default_priority() -> i32 {
    100
}

fn default_enabled() -> bool {
    true
}

impl RuleDefinition {
    /// Create a template-backed definition
    pub fn template(
        name: impl Into<String>,
        rule_code: impl Into<String>,
        action: RuleAction,
        response_code: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: String::new(),
            rule_code: rule_code.into(),
            parameters: HashMap::new(),
            condition: None,
            action,
            response_code: response_code.into(),
            response_message: String::new(),
            priority: default_priority(),
            enabled: true,
            category: RuleCategory::Custom,
        }
    }

    /// Create a DSL-backed definition
    pub fn dsl(
        name: impl Into<String>,
        condition: ConditionNode,
        action: RuleAction,
        response_code: impl Into<String>,
    ) -> Self {
        let mut def = Self::template(name, "", action, response_code);
        def.condition = Some(condition);
        def
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.response_message = message.into();
        self
    }

    pub fn with_category(mut self, category: RuleCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Where a rule came from; decides what survives a restart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleSource {
    /// Registered from code
    #[default]
    Native,
    /// Built from a definition supplied at boot (rule files, builder)
    Boot,
    /// Created at runtime through the admin surface
    Admin,
}

/// A unit of authorization policy
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Unique, stable id
    pub id: String,

    pub name: String,

    pub description: String,

    /// Lower value evaluates first
    pub priority: i32,

    /// Disabled rules are never evaluated
    pub enabled: bool,

    pub category: RuleCategory,

    pub source: RuleSource,

    pub action: RuleAction,

    /// Response code emitted when this rule decides
    pub response_code: String,

    pub response_message: String,

    #[serde(skip_serializing)]
    pub condition: Condition,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// Originating definition for rules built from one
    #[serde(skip_serializing)]
    pub definition: Option<RuleDefinition>,
}

impl Rule {
    /// Create an enabled rule with default priority (100) and category CUSTOM
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        action: RuleAction,
        response_code: impl Into<String>,
        condition: Condition,
    ) -> Self {
        let now = Utc::now();
        Rule {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            priority: default_priority(),
            enabled: true,
            category: RuleCategory::Custom,
            source: RuleSource::Native,
            action,
            response_code: response_code.into(),
            response_message: String::new(),
            condition,
            created_at: now,
            updated_at: now,
            definition: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.response_message = message.into();
        self
    }

    pub fn with_category(mut self, category: RuleCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_source(mut self, source: RuleSource) -> Self {
        self.source = source;
        self
    }

    /// Whether the full rule is persisted, rather than just its overrides.
    ///
    /// Native and boot rules are rebuilt from code or files on every start;
    /// only admin-created rules need their definition stored.
    pub fn is_persistable(&self) -> bool {
        self.source == RuleSource::Admin && self.definition.is_some()
    }

    /// Persisted administrative state of this rule
    pub fn state(&self) -> RuleState {
        RuleState {
            id: self.id.clone(),
            priority: self.priority,
            enabled: self.enabled,
        }
    }

    /// Current definition, with live priority and enabled flag
    pub fn current_definition(&self) -> Option<RuleDefinition> {
        self.definition.as_ref().map(|def| {
            let mut def = def.clone();
            def.id = Some(self.id.clone());
            def.priority = self.priority;
            def.enabled = self.enabled;
            def
        })
    }
}

/// Administrative overrides persisted across restarts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleState {
    pub id: String,
    pub priority: i32,
    pub enabled: bool,
}

/// A rule that fired during one evaluation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedRule {
    pub rule_id: String,
    pub rule_name: String,
    pub action: RuleAction,
    pub response_code: String,
    /// Set on the single authoritative match
    pub was_deciding: bool,
}

impl MatchedRule {
    pub fn from_rule(rule: &Rule) -> Self {
        Self {
            rule_id: rule.id.clone(),
            rule_name: rule.name.clone(),
            action: rule.action,
            response_code: rule.response_code.clone(),
            was_deciding: false,
        }
    }
}

/// Final authorization decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub action: RuleAction,
    pub response_code: String,
    pub response_message: String,
}

impl Decision {
    pub fn is_approved(&self) -> bool {
        self.action == RuleAction::Approve
    }
}
