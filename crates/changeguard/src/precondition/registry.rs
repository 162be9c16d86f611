//! Registry of custom precondition factories.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::error::{ChangeError, Result};

use super::builtins::{DbmsPrecondition, TableExistsPrecondition};
use super::CustomPrecondition;

/// Builds a fresh, unconfigured precondition.
pub type PreconditionFactory = Arc<dyn Fn() -> Box<dyn CustomPrecondition> + Send + Sync>;

/// Precondition types keyed by name.
#[derive(Default, Clone)]
pub struct PreconditionRegistry {
    factories: HashMap<String, PreconditionFactory>,
}

impl PreconditionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `tableExists` and `dbms`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("tableExists", || {
            Box::new(TableExistsPrecondition::default()) as Box<dyn CustomPrecondition>
        });
        registry.register("dbms", || {
            Box::new(DbmsPrecondition::default()) as Box<dyn CustomPrecondition>
        });
        registry
    }

    /// Register a factory, replacing any previous one with the same name.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn CustomPrecondition> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Create a precondition and apply `params` in key order.
    pub fn instantiate(
        &self,
        name: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<Box<dyn CustomPrecondition>> {
        let factory = self.factories.get(name).ok_or_else(|| {
            ChangeError::PreconditionFailed(format!(
                "Could not open custom precondition class {}",
                name
            ))
        })?;

        let mut precondition = factory();
        for (param, value) in params {
            precondition.set_param(param, value).map_err(|_| {
                ChangeError::PreconditionFailed(format!(
                    "error setting parameter {} on custom precondition {}",
                    param, name
                ))
            })?;
        }
        Ok(precondition)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for PreconditionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreconditionRegistry")
            .field("names", &self.names())
            .finish()
    }
}
