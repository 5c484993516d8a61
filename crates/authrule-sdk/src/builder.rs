//! Builder pattern for AuthorizationEngine

use crate::authorization::{validate_rule_definition, AuthorizationEngine};
use crate::builtin::builtin_rules;
use crate::config::EngineConfig;
use crate::error::{Result, SdkError};
use authrule_core::{Rule, RuleDefinition};
use authrule_repository::{
    load_rule_directory, load_rule_file, FileRuleStateStore, MemoryRuleStateStore, RuleStateStore,
};
use authrule_runtime::{MetricsCollector, RuleEngine, RuleFactory, TemplateRuleFactory};
use std::path::PathBuf;
use std::sync::Arc;

/// Builder for AuthorizationEngine
///
/// Boot order: built-in rules, rule files (or directories of them), extra
/// rules and definitions, then the persisted state from the store (custom
/// rules replace rules with the same id, overrides are applied last).
///
/// Definitions loaded at boot are validated like admin-created ones; an
/// invalid one fails the build. Id-less builder definitions are numbered
/// `BOOT_<n>` in the order they were added.
///
/// # Example
///
/// ```rust,ignore
/// use authrule_sdk::AuthorizationEngineBuilder;
///
/// let engine = AuthorizationEngineBuilder::new()
///     .add_rule_file("rules/limits.yaml")
///     .with_state_file("data/rule-state.json")
///     .enable_metrics(true)
///     .build()
///     .await?;
/// ```
pub struct AuthorizationEngineBuilder {
    config: EngineConfig,
    factory: Option<Arc<dyn RuleFactory>>,
    store: Option<Arc<dyn RuleStateStore>>,
    rules: Vec<Rule>,
    definitions: Vec<RuleDefinition>,
}

impl AuthorizationEngineBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::from_config(EngineConfig::new())
    }

    /// Start from an existing configuration
    pub fn from_config(config: EngineConfig) -> Self {
        Self {
            config,
            factory: None,
            store: None,
            rules: Vec::new(),
            definitions: Vec::new(),
        }
    }

    /// Add a rule definition file, or a directory of them
    pub fn add_rule_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.rule_files.push(path.into());
        self
    }

    /// Persist admin changes to this file
    pub fn with_state_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.state_file = Some(path.into());
        self
    }

    /// Use a custom state store; takes precedence over the state file
    pub fn with_store(mut self, store: Arc<dyn RuleStateStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use a custom rule factory; takes precedence over the reference offset
    pub fn with_factory(mut self, factory: Arc<dyn RuleFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Register a native rule at boot
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Install a rule definition at boot
    pub fn with_rule_definition(mut self, definition: RuleDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    pub fn with_reference_offset_seconds(mut self, seconds: i32) -> Self {
        self.config.reference_utc_offset_seconds = seconds;
        self
    }

    pub fn with_issuer_country(mut self, country: impl Into<String>) -> Self {
        self.config.issuer_country = country.into();
        self
    }

    /// Register the built-in policy rules
    pub fn load_builtin_rules(mut self, load: bool) -> Self {
        self.config.load_builtin_rules = load;
        self
    }

    /// Enable metrics
    pub fn enable_metrics(mut self, enable: bool) -> Self {
        self.config.enable_metrics = enable;
        self
    }

    /// Enable tracing
    pub fn enable_tracing(mut self, enable: bool) -> Self {
        self.config.enable_tracing = enable;
        self
    }

    /// Build the authorization engine
    pub async fn build(self) -> Result<AuthorizationEngine> {
        let factory = match self.factory {
            Some(factory) => factory,
            None => {
                let offset = self.config.reference_utc_offset_seconds;
                let factory = TemplateRuleFactory::with_offset_seconds(offset).ok_or_else(|| {
                    SdkError::Config(format!("UTC offset out of range: {} seconds", offset))
                })?;
                Arc::new(factory) as Arc<dyn RuleFactory>
            }
        };

        let mut engine = RuleEngine::new(factory);
        if self.config.enable_metrics {
            engine = engine.with_metrics(Arc::new(MetricsCollector::new()));
        }

        if self.config.load_builtin_rules {
            for rule in builtin_rules(&self.config.issuer_country) {
                engine.register_rule(rule);
            }
        }

        for path in &self.config.rule_files {
            let definitions = if path.is_dir() {
                load_rule_directory(path).await?
            } else {
                load_rule_file(path).await?
            };
            tracing::info!("Loading {} rules from {}", definitions.len(), path.display());
            for definition in definitions {
                validate_rule_definition(engine.factory().as_ref(), &definition).map_err(|e| match e {
                    SdkError::InvalidRule(reason) => {
                        SdkError::InvalidRule(format!("{}: {}", path.display(), reason))
                    }
                    other => other,
                })?;
                engine.load_definition(definition);
            }
        }

        for rule in self.rules {
            engine.register_rule(rule);
        }
        for (index, mut definition) in self.definitions.into_iter().enumerate() {
            if definition.id.as_deref().map(|id| id.trim().is_empty()).unwrap_or(true) {
                definition.id = Some(format!("BOOT_{}", index + 1));
            }
            validate_rule_definition(engine.factory().as_ref(), &definition)?;
            engine.load_definition(definition);
        }

        let store: Arc<dyn RuleStateStore> = match (self.store, &self.config.state_file) {
            (Some(store), _) => store,
            (None, Some(path)) => Arc::new(FileRuleStateStore::new(path)?),
            (None, None) => Arc::new(MemoryRuleStateStore::new()),
        };

        let authorization = AuthorizationEngine::new(Arc::new(engine), store, self.config);
        authorization.restore().await?;

        tracing::info!(
            rules = authorization.rule_stats().total,
            "Authorization engine ready"
        );
        Ok(authorization)
    }
}

impl Default for AuthorizationEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
