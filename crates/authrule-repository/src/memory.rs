//! In-memory rule state store

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{RepositoryResult, RuleSnapshot, RuleStateStore};

/// Store that keeps the snapshot in memory.
///
/// Used when no state file is configured and in tests.
#[derive(Debug, Default)]
pub struct MemoryRuleStateStore {
    snapshot: RwLock<RuleSnapshot>,
    saves: RwLock<usize>,
}

impl MemoryRuleStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a snapshot
    pub fn with_snapshot(snapshot: RuleSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
            saves: RwLock::new(0),
        }
    }

    /// Number of saves performed
    pub async fn save_count(&self) -> usize {
        *self.saves.read().await
    }
}

#[async_trait]
impl RuleStateStore for MemoryRuleStateStore {
    async fn load(&self) -> RepositoryResult<RuleSnapshot> {
        Ok(self.snapshot.read().await.clone())
    }

    async fn save(&self, snapshot: &RuleSnapshot) -> RepositoryResult<()> {
        *self.snapshot.write().await = snapshot.clone();
        *self.saves.write().await += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
