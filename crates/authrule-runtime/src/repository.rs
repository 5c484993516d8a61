//! In-memory rule storage
//!
//! Every read hands out copies; callers never hold references into the live
//! rule list.

use authrule_core::Rule;
use chrono::Utc;

/// Ordered collection of rules, kept in insertion order
#[derive(Debug, Clone, Default)]
pub struct RuleRepository {
    rules: Vec<Rule>,
}

impl RuleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule. Ids are expected to be unique; duplicates are kept as-is
    /// and every id-based operation acts on the first one.
    pub fn add(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Remove the first rule with this id, returning whether it existed
    pub fn remove(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(index) => {
                self.rules.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> bool {
        self.update(id, |rule| rule.enabled = enabled)
    }

    pub fn set_priority(&mut self, id: &str, priority: i32) -> bool {
        self.update(id, |rule| rule.priority = priority)
    }

    /// All rules in insertion order
    pub fn get_all(&self) -> Vec<Rule> {
        self.rules.clone()
    }

    pub fn get_by_id(&self, id: &str) -> Option<Rule> {
        self.find(id).cloned()
    }

    pub(crate) fn find(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Enabled rules by ascending priority.
    ///
    /// The sort is stable: rules with equal priority keep their insertion
    /// order, which keeps decisions reproducible.
    pub fn get_sorted_enabled(&self) -> Vec<Rule> {
        let mut enabled: Vec<Rule> = self.rules.iter().filter(|r| r.enabled).cloned().collect();
        enabled.sort_by_key(|r| r.priority);
        enabled
    }

    pub fn clear(&mut self) {
        self.rules.clear();
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.rules.iter().position(|r| r.id == id)
    }

    fn update(&mut self, id: &str, apply: impl FnOnce(&mut Rule)) -> bool {
        match self.rules.iter_mut().find(|r| r.id == id) {
            Some(rule) => {
                apply(rule);
                rule.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }
}
