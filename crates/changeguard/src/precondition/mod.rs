//! Custom preconditions.
//!
//! Precondition types are registered by name in a [`PreconditionRegistry`]
//! at startup. A changeset refers to them through a
//! [`CustomPreconditionWrapper`] holding the type name and its parameters.

mod builtins;
mod registry;
mod wrapper;

pub use builtins::{DbmsPrecondition, TableExistsPrecondition};
pub use registry::{PreconditionFactory, PreconditionRegistry};
pub use wrapper::CustomPreconditionWrapper;

use crate::core::descriptor::DialectDescriptor;
use crate::core::schema::Snapshot;
use crate::error::Result;

/// A check run against the target database before a changeset.
pub trait CustomPrecondition: Send + Sync {
    /// Set a named parameter. Unknown names are an error.
    fn set_param(&mut self, name: &str, value: &str) -> Result<()>;

    /// Evaluate the precondition.
    ///
    /// Returns `PreconditionFailed` when the database is not in the expected
    /// state and `PreconditionError` when the check itself cannot run.
    fn check(&self, db: &DialectDescriptor, snapshot: &Snapshot) -> Result<()>;
}
