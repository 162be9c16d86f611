//! Named, parameterized reference to a registered precondition.

use std::collections::BTreeMap;

use tracing::debug;

use crate::core::descriptor::DialectDescriptor;
use crate::core::schema::Snapshot;
use crate::error::{ChangeError, Result};

use super::registry::PreconditionRegistry;

/// A precondition as declared on a changeset: a registered type name plus
/// its parameters. Parameters are kept sorted by name and applied in that
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomPreconditionWrapper {
    pub class_name: String,
    params: BTreeMap<String, String>,
}

impl CustomPreconditionWrapper {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            params: BTreeMap::new(),
        }
    }

    /// Add a parameter (builder style).
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_param(name, value);
        self
    }

    pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.insert(name.into(), value.into());
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Instantiate through `registry` and run the check.
    ///
    /// A failed check is reported as `Custom Precondition Failed: <msg>`.
    /// Any error other than a failure becomes `PreconditionError`.
    pub fn check(
        &self,
        registry: &PreconditionRegistry,
        db: &DialectDescriptor,
        snapshot: &Snapshot,
    ) -> Result<()> {
        let precondition = registry.instantiate(&self.class_name, &self.params)?;

        debug!("Checking custom precondition {}", self.class_name);
        match precondition.check(db, snapshot) {
            Ok(()) => Ok(()),
            Err(ChangeError::PreconditionFailed(msg)) => Err(ChangeError::PreconditionFailed(
                format!("Custom Precondition Failed: {}", msg),
            )),
            Err(err @ ChangeError::PreconditionError(_)) => Err(err),
            Err(other) => Err(ChangeError::PreconditionError(other.to_string())),
        }
    }
}
