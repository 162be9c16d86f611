//! Dialect-neutral schema changes.
//!
//! Every change validates its own fields and generates an ordered statement
//! sequence for a target dialect. Behavior is selected by the dialect's
//! declared [`Capability`](crate::core::Capability) values, never by which
//! concrete dialect is in use.

mod add_auto_increment;
mod drop_foreign_key;
mod drop_table;
mod raw_sql;
mod validation;

pub use add_auto_increment::AddAutoIncrement;
pub use drop_foreign_key::DropForeignKeyConstraint;
pub use drop_table::DropTable;
pub use raw_sql::RawSql;
pub use validation::{ValidationFailure, ValidationResult};

use async_trait::async_trait;

use crate::core::descriptor::DialectDescriptor;
use crate::core::schema::{DatabaseObjectRef, DeletedObjects};
use crate::core::statement::Statement;
use crate::error::Result;
use crate::introspect::SnapshotProvider;

/// One schema mutation.
#[async_trait]
pub trait Change: Send + Sync {
    /// Change type name (e.g., "dropTable").
    fn change_name(&self) -> &str;

    /// Check required fields without touching the database.
    fn validate(&self) -> ValidationResult;

    /// Produce the statements implementing this change on `db`.
    ///
    /// Output depends only on `db` and the snapshot contents, so repeated
    /// calls against an unchanged snapshot are byte-identical.
    async fn generate_statements(
        &self,
        db: &DialectDescriptor,
        provider: &SnapshotProvider,
    ) -> Result<Vec<Statement>> {
        self.generate_statements_after(db, provider, &DeletedObjects::new())
            .await
    }

    /// Produce the statements for this change when earlier changes in the
    /// same run already delete `prior`.
    ///
    /// The snapshot predates those earlier changes; trigger repairs account
    /// for `prior` so they neither revive removed rules nor drop a trigger
    /// name that no longer exists.
    async fn generate_statements_after(
        &self,
        db: &DialectDescriptor,
        provider: &SnapshotProvider,
        prior: &DeletedObjects,
    ) -> Result<Vec<Statement>>;

    /// Human-readable summary shown after the change runs.
    fn confirmation_message(&self) -> String;

    /// Objects this change creates, alters or removes.
    fn affected_objects(&self) -> Vec<DatabaseObjectRef>;
}
