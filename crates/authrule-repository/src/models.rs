//! Persisted rule state

use authrule_core::{RuleDefinition, RuleState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// Everything needed to restore administrative changes after a restart.
///
/// Built-in rules live in code, so only their overrides are kept. Rules
/// created from definitions are stored whole and rebuilt at boot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSnapshot {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,

    /// Priority and enabled overrides, keyed by rule id
    #[serde(default)]
    pub overrides: Vec<RuleState>,

    /// Definitions of rules created at runtime
    #[serde(default)]
    pub custom_rules: Vec<RuleDefinition>,
}

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

impl Default for RuleSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            saved_at: None,
            overrides: Vec::new(),
            custom_rules: Vec::new(),
        }
    }
}

impl RuleSnapshot {
    pub fn new(overrides: Vec<RuleState>, custom_rules: Vec<RuleDefinition>) -> Self {
        Self {
            overrides,
            custom_rules,
            ..Self::default()
        }
    }

    /// Stamp the snapshot with the current time
    pub fn stamped(mut self) -> Self {
        self.saved_at = Some(Utc::now());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty() && self.custom_rules.is_empty()
    }

    /// Ids of the custom rules in the snapshot
    pub fn custom_rule_ids(&self) -> Vec<&str> {
        self.custom_rules
            .iter()
            .filter_map(|def| def.id.as_deref())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use authrule_core::RuleAction;

    #[test]
    fn test_snapshot_json_layout() {
        let snapshot = RuleSnapshot::new(
            vec![RuleState {
                id: "STOLEN_CARD".to_string(),
                priority: 1,
                enabled: false,
            }],
            vec![RuleDefinition::template("Big", "AMOUNT_ABOVE", RuleAction::Deny, "61")
                .with_id("CUSTOM_1")
                .with_param("threshold", 900.0)],
        );

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["version"], 1);
        assert_eq!(json["overrides"][0]["id"], "STOLEN_CARD");
        assert_eq!(json["customRules"][0]["ruleCode"], "AMOUNT_ABOVE");
        assert!(json.get("savedAt").is_none());
        assert_eq!(snapshot.custom_rule_ids(), vec!["CUSTOM_1"]);
    }

    #[test]
    fn test_missing_fields_default() {
        let snapshot: RuleSnapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(snapshot, RuleSnapshot::default());
        assert!(snapshot.is_empty());
    }
}
