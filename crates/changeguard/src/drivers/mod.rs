//! Database driver implementations.
//!
//! This module provides database-specific implementations of the core traits:
//!
//! - [`mssql`]: Microsoft SQL Server (dialect and live introspector)
//! - [`postgres`]: PostgreSQL
//! - [`mysql`]: MySQL/MariaDB
//! - [`sqlite`]: SQLite
//! - [`derby`]: Apache Derby
//! - [`standard`]: Standard SQL fallback for unrecognized databases
//!
//! # Adding New Databases
//!
//! To add support for a new database:
//!
//! 1. Create a new module under `drivers/` (e.g., `drivers/h2/`)
//! 2. Implement `Dialect`, declaring the capabilities the engine supports
//! 3. Register it (and any aliases) in `DialectCatalog::with_builtins()`
//!
//! Changes dispatch on capabilities, so no change implementation needs editing.

pub mod derby;
pub mod mssql;
pub mod mysql;
pub mod postgres;
pub mod sqlite;
pub mod standard;

// Re-export driver types
pub use derby::DerbyDialect;
pub use mssql::MssqlDialect;
#[cfg(feature = "mssql")]
pub use mssql::{MssqlClient, MssqlIntrospector};
pub use mysql::MysqlDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;
pub use standard::StandardDialect;
