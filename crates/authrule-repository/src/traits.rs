//! Storage abstraction for rule state

use async_trait::async_trait;

use crate::{RepositoryResult, RuleSnapshot};

/// Durable home of the administrative rule state.
///
/// Implementations replace the whole snapshot on every save; the rule set is
/// small and admin mutations are rare.
#[async_trait]
pub trait RuleStateStore: Send + Sync {
    /// Load the last saved snapshot; an empty snapshot if nothing was saved yet
    async fn load(&self) -> RepositoryResult<RuleSnapshot>;

    /// Replace the stored snapshot
    async fn save(&self, snapshot: &RuleSnapshot) -> RepositoryResult<()>;

    /// Human readable location, for logs
    fn location(&self) -> String;
}
