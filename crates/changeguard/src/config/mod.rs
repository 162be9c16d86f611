//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use std::path::Path;

use crate::cascade::TriggerConvention;
use crate::changeset::RanChangeSet;
use crate::core::catalog::DialectCatalog;
use crate::core::descriptor::DialectDescriptor;
use crate::error::Result;
use crate::filter::{ContextFilter, DbmsFilter, ExecutedAfterFilter};

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// Resolve the target dialect. Unknown names fall back to standard SQL.
    pub fn descriptor(&self, catalog: &DialectCatalog) -> DialectDescriptor {
        catalog.descriptor(&self.target.r#type, self.target.default_schema.as_deref())
    }

    pub fn trigger_convention(&self) -> Result<TriggerConvention> {
        TriggerConvention::new(&self.triggers.table_prefix)
    }

    pub fn context_filter(&self) -> ContextFilter {
        ContextFilter::new(self.run.contexts.iter().cloned())
    }

    /// Filter admitting changesets that target the configured dialect under
    /// its name or any alias.
    pub fn dbms_filter(&self, catalog: &DialectCatalog) -> DbmsFilter {
        DbmsFilter::for_descriptor(&self.descriptor(catalog))
    }

    /// Filter admitting ledger entries that ran after `run.executed_after`.
    ///
    /// `None` when no cutoff is configured.
    pub fn executed_after_filter(&self, ledger: &[RanChangeSet]) -> Option<ExecutedAfterFilter> {
        self.run
            .executed_after
            .map(|cutoff| ExecutedAfterFilter::new(cutoff, ledger))
    }
}
