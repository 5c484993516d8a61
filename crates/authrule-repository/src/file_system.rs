//! File backed rule state store

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::models::SNAPSHOT_VERSION;
use crate::{RepositoryError, RepositoryResult, RuleSnapshot, RuleStateStore};

/// Stores the snapshot as pretty-printed JSON in a single file.
///
/// Saves go through a sibling temporary file and a rename, so a crash
/// mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct FileRuleStateStore {
    path: PathBuf,
}

impl FileRuleStateStore {
    /// Create a store at `path`. The file does not need to exist yet.
    pub fn new<P: AsRef<Path>>(path: P) -> RepositoryResult<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() || path.is_dir() {
            return Err(RepositoryError::InvalidPath {
                path: path.to_path_buf(),
            });
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl RuleStateStore for FileRuleStateStore {
    async fn load(&self) -> RepositoryResult<RuleSnapshot> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No rule state at {}, starting clean", self.path.display());
                return Ok(RuleSnapshot::default());
            }
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(RuleSnapshot::default());
        }

        let snapshot: RuleSnapshot = serde_json::from_str(&content)?;
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(RepositoryError::UnsupportedVersion {
                found: snapshot.version,
                supported: SNAPSHOT_VERSION,
            });
        }

        tracing::debug!(
            overrides = snapshot.overrides.len(),
            custom_rules = snapshot.custom_rules.len(),
            "Loaded rule state from {}",
            self.path.display()
        );
        Ok(snapshot)
    }

    async fn save(&self, snapshot: &RuleSnapshot) -> RepositoryResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(snapshot)?;
        let temp = self.temp_path();
        fs::write(&temp, content).await?;
        fs::rename(&temp, &self.path).await?;

        tracing::debug!("Saved rule state to {}", self.path.display());
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
