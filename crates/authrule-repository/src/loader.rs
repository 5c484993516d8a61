//! Rule definition files
//!
//! A rule file is YAML (or JSON) holding either a plain list of rule
//! definitions or a mapping with a `rules` list.
//!
//! Entries without an `id` get one derived from the file name and their
//! position (`limits.yaml` entry 2 becomes `LIMITS_2`), so the same file
//! yields the same ids on every load.

use authrule_core::RuleDefinition;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::{RepositoryError, RepositoryResult};

#[derive(Deserialize)]
#[serde(untagged)]
enum RuleFile {
    List(Vec<RuleDefinition>),
    Document { rules: Vec<RuleDefinition> },
}

/// Parse rule definitions from file content
pub fn parse_rule_definitions(content: &str) -> RepositoryResult<Vec<RuleDefinition>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    let file: RuleFile = serde_yaml::from_str(content)?;
    Ok(match file {
        RuleFile::List(rules) => rules,
        RuleFile::Document { rules } => rules,
    })
}

/// Load rule definitions from one file
pub async fn load_rule_file<P: AsRef<Path>>(path: P) -> RepositoryResult<Vec<RuleDefinition>> {
    let path = path.as_ref();
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(RepositoryError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    let mut rules = parse_rule_definitions(&content)?;
    assign_missing_ids(path, &mut rules);
    tracing::debug!("Loaded {} rule definitions from {}", rules.len(), path.display());
    Ok(rules)
}

/// Load every `.yaml`/`.yml`/`.json` file of a directory, in file name order
pub async fn load_rule_directory<P: AsRef<Path>>(dir: P) -> RepositoryResult<Vec<RuleDefinition>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(RepositoryError::InvalidPath {
            path: dir.to_path_buf(),
        });
    }

    let mut files: Vec<PathBuf> = Vec::new();
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_rule_file = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| matches!(ext, "yaml" | "yml" | "json"))
            .unwrap_or(false);
        if is_rule_file && path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    let mut rules = Vec::new();
    for file in files {
        rules.extend(load_rule_file(&file).await?);
    }
    Ok(rules)
}

fn assign_missing_ids(path: &Path, rules: &mut [RuleDefinition]) {
    let prefix: String = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("RULES")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();

    for (index, rule) in rules.iter_mut().enumerate() {
        let missing = rule.id.as_deref().map(|id| id.trim().is_empty()).unwrap_or(true);
        if missing {
            rule.id = Some(format!("{}_{}", prefix, index + 1));
        }
    }
}
