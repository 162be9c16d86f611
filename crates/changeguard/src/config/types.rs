//! Configuration type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cascade::DEFAULT_TABLE_PREFIX;

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Target database configuration.
    pub target: TargetConfig,

    /// Cascade trigger naming convention.
    #[serde(default)]
    pub triggers: TriggersConfig,

    /// Changeset admission settings.
    #[serde(default)]
    pub run: RunConfig,
}

/// Target database configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Dialect identity (e.g., "mssql", "postgresql"). Aliases are accepted.
    pub r#type: String,

    /// Schema used when a change names none.
    #[serde(default)]
    pub default_schema: Option<String>,
}

/// Cascade trigger configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggersConfig {
    /// Prefix marking tables whose delete cascades are trigger-managed
    /// (default: "cxml_").
    #[serde(default = "default_table_prefix")]
    pub table_prefix: String,
}

impl Default for TriggersConfig {
    fn default() -> Self {
        Self {
            table_prefix: default_table_prefix(),
        }
    }
}

/// Changeset admission configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Run contexts; empty admits every changeset.
    #[serde(default)]
    pub contexts: Vec<String>,

    /// Only admit changesets the ledger records as executed after this time.
    #[serde(default)]
    pub executed_after: Option<DateTime<Utc>>,
}

fn default_table_prefix() -> String {
    DEFAULT_TABLE_PREFIX.to_string()
}
