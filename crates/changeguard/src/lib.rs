//! # changeguard
//!
//! Dialect-aware schema change generation.
//!
//! This library turns dialect-neutral schema changes into ordered SQL
//! statements for a target database, with support for:
//!
//! - **Capability-driven generation** across SQL Server, PostgreSQL, MySQL,
//!   SQLite, Derby and a standard-SQL fallback
//! - **Cascade trigger repair** on SQL Server, where `ON DELETE SET NULL` is
//!   emulated with `INSTEAD OF DELETE` triggers that must be rewritten when a
//!   referenced table or foreign key is dropped
//! - **Changeset admission** against an execution ledger, by timestamp cutoff,
//!   dialect and run context
//! - **Custom preconditions** registered by name
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use changeguard::{
//!     ChangeSet, Config, DialectCatalog, DropTable, MemoryIntrospector, SnapshotProvider,
//! };
//!
//! #[tokio::main]
//! async fn main() -> changeguard::Result<()> {
//!     let config = Config::load("changeguard.yaml")?;
//!     let catalog = DialectCatalog::with_builtins();
//!     let db = config.descriptor(&catalog);
//!     let provider = SnapshotProvider::new(
//!         Arc::new(MemoryIntrospector::new()),
//!         config.trigger_convention()?,
//!     );
//!
//!     let changeset = ChangeSet::new("1", "bob", "changelog.xml")
//!         .with_change(DropTable::new("cxml_page"));
//!     for statement in changeset.generate_statements(&db, &provider).await? {
//!         println!("{}{}", statement.to_sql(&db)?, statement.end_delimiter());
//!     }
//!     Ok(())
//! }
//! ```

pub mod cascade;
pub mod change;
pub mod changeset;
pub mod config;
pub mod core;
pub mod drivers;
pub mod error;
pub mod filter;
pub mod introspect;
pub mod precondition;

// Re-exports for convenient access
pub use cascade::{TriggerConvention, TriggerEngine, TriggerRepair, DEFAULT_TABLE_PREFIX};
pub use change::{
    AddAutoIncrement, Change, DropForeignKeyConstraint, DropTable, RawSql, ValidationResult,
};
pub use changeset::{ChangeSet, ChangeSetId, RanChangeSet};
pub use config::{Config, RunConfig, TargetConfig, TriggersConfig};
pub use crate::core::{
    Capability, DatabaseObjectRef, DeletedObjects, Dialect, DialectCatalog, DialectDescriptor,
    Introspector, LogicalType, Snapshot, Statement,
};
pub use error::{ChangeError, Result};
pub use filter::{accepts_all, ChangeSetFilter, ContextFilter, DbmsFilter, ExecutedAfterFilter};
pub use introspect::{MemoryIntrospector, SnapshotProvider};
pub use precondition::{CustomPrecondition, CustomPreconditionWrapper, PreconditionRegistry};

#[cfg(feature = "mssql")]
pub use drivers::MssqlIntrospector;
