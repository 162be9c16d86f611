//! Core abstractions for dialect-aware change generation.
//!
//! This module provides the foundational types and traits used throughout
//! the engine:
//!
//! - [`schema`]: Table, column, key and trigger metadata; the schema snapshot
//! - [`statement`]: Generated SQL statements with applicability predicates
//! - [`traits`]: Dialect strategy and introspection traits
//! - [`descriptor`]: Per-connection dialect descriptor
//! - [`catalog`]: Dialect registry for dependency injection
//!
//! # Design Patterns
//!
//! - **Strategy**: `Dialect` provides interchangeable SQL syntax and capabilities
//! - **Template Method**: `Introspector::capture_snapshot` builds on the
//!   per-query trait methods

pub mod catalog;
pub mod descriptor;
pub mod identifier;
pub mod schema;
pub mod statement;
pub mod traits;

// Re-export commonly used types for convenience
pub use catalog::{DialectCatalog, STANDARD_DIALECT};
pub use descriptor::DialectDescriptor;
pub use schema::{
    CascadeRule, Column, DatabaseObjectRef, DeletedObjects, ForeignKey, PrimaryKey, Snapshot,
    Table, TriggerHeader, TriggerInfo,
};
pub use statement::{cascade_trigger_name, Applicability, Statement, END_DELIMITER};
pub use traits::{Capability, Dialect, Introspector, LogicalType};
