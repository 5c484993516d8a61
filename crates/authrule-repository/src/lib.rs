//! Persistence layer for the authorization rule engine
//!
//! Administrative changes to the rule set (enabling, disabling and
//! re-prioritizing rules, rules created at runtime) survive restarts through a
//! [`RuleStateStore`]. Rule definition files are read by the [`loader`]
//! functions.
//!
//! # Quick Start
//!
//! ```no_run
//! use authrule_repository::{FileRuleStateStore, RuleStateStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = FileRuleStateStore::new("data/rule-state.json")?;
//!
//!     let mut snapshot = store.load().await?;
//!     snapshot.overrides.clear();
//!     store.save(&snapshot).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod file_system;
pub mod loader;
pub mod memory;
pub mod models;
pub mod traits;

// Re-exports - Error
pub use error::{RepositoryError, RepositoryResult};

// Re-exports - Stores
pub use file_system::FileRuleStateStore;
pub use memory::MemoryRuleStateStore;
pub use models::{RuleSnapshot, SNAPSHOT_VERSION};
pub use traits::RuleStateStore;

// Re-exports - Loader
pub use loader::{load_rule_directory, load_rule_file, parse_rule_definitions};
