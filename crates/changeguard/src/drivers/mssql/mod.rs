//! Microsoft SQL Server driver.
//!
//! This module provides MSSQL-specific implementations:
//!
//! - [`MssqlDialect`]: SQL syntax strategy for MSSQL
//! - [`MssqlIntrospector`]: live schema and trigger introspection (feature `mssql`)

mod dialect;
#[cfg(feature = "mssql")]
mod introspect;

pub use dialect::MssqlDialect;
#[cfg(feature = "mssql")]
pub use introspect::{MssqlClient, MssqlIntrospector};
