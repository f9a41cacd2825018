//! Container task definitions as an environment snapshot.
//!
//! Reads the `containerDefinitions` of an ECS-style task definition and
//! records every variable declared under `environment` or `secrets`. The
//! file is read once; lookups afterwards are in-memory.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use super::ExistenceCheck;

/// Errors raised while loading a task definition.
#[derive(Error, Debug)]
pub enum DefinitionError {
    #[error("failed to read task definition '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse task definition: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDefinition {
    #[serde(default)]
    container_definitions: Vec<RawContainer>,
}

#[derive(Debug, Default, Deserialize)]
struct RawContainer {
    #[serde(default)]
    environment: Vec<RawVariable>,
    #[serde(default)]
    secrets: Vec<RawVariable>,
}

#[derive(Debug, Deserialize)]
struct RawVariable {
    #[serde(default)]
    name: Option<String>,
}

/// Set of variable names declared by a task definition.
#[derive(Debug, Clone, Default)]
pub struct TaskDefinition {
    names: HashSet<String>,
}

impl TaskDefinition {
    /// Load a task definition from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DefinitionError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| DefinitionError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let definition = Self::from_json(&content)?;
        tracing::debug!(
            path = %path.display(),
            variables = definition.len(),
            "task definition loaded"
        );
        Ok(definition)
    }

    /// Parse a task definition from JSON text.
    pub fn from_json(content: &str) -> Result<Self, DefinitionError> {
        let raw: RawDefinition = serde_json::from_str(content)?;
        let names = raw
            .container_definitions
            .into_iter()
            .flat_map(|c| c.environment.into_iter().chain(c.secrets))
            .filter_map(|v| v.name)
            .filter(|name| !name.is_empty())
            .collect();
        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl ExistenceCheck for TaskDefinition {
    fn exists(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFINITION: &str = r#"{
        "family": "api",
        "containerDefinitions": [
            {
                "name": "web",
                "environment": [
                    {"name": "PORT", "value": "8080"},
                    {"name": "DEBUG", "value": ""}
                ],
                "secrets": [
                    {"name": "DATABASE_URL", "valueFrom": "arn:aws:ssm:example"}
                ]
            },
            {
                "name": "sidecar",
                "environment": [{"value": "orphan"}]
            }
        ]
    }"#;

    #[test]
    fn test_environment_and_secrets_are_present() {
        let definition = TaskDefinition::from_json(DEFINITION).unwrap();

        assert_eq!(definition.len(), 3);
        assert!(definition.exists("PORT"));
        assert!(definition.exists("DEBUG"));
        assert!(definition.exists("DATABASE_URL"));
        assert!(!definition.exists("REDIS_URL"));
    }

    #[test]
    fn test_missing_container_definitions() {
        let definition = TaskDefinition::from_json("{}").unwrap();
        assert!(definition.is_empty());
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            TaskDefinition::from_json("[1, 2"),
            Err(DefinitionError::Parse(_))
        ));
    }
}
