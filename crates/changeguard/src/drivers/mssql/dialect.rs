//! MSSQL SQL dialect (Strategy pattern).
//!
//! SQL Server implements cascading deletes for managed tables through
//! hand-authored `INSTEAD OF DELETE` triggers, so dropping a table or foreign
//! key here may require trigger repair.

use crate::core::identifier::quote_brackets;
use crate::core::traits::{Capability, Dialect, LogicalType};

/// Microsoft SQL Server dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct MssqlDialect;

impl MssqlDialect {
    /// Create a new MSSQL dialect instance.
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for MssqlDialect {
    fn name(&self) -> &str {
        "mssql"
    }

    fn quote_ident(&self, name: &str) -> String {
        quote_brackets(name)
    }

    fn supports(&self, capability: Capability) -> bool {
        matches!(
            capability,
            Capability::ForeignKeys | Capability::CascadeViaTriggers
        )
    }

    fn type_name(&self, logical: LogicalType) -> &str {
        match logical {
            LogicalType::Boolean => "BIT",
            LogicalType::Currency => "MONEY",
            LogicalType::Uuid => "UNIQUEIDENTIFIER",
            LogicalType::Clob => "TEXT",
            LogicalType::Blob => "IMAGE",
            LogicalType::DateTime => "DATETIME",
        }
    }

    fn current_datetime_function(&self) -> &str {
        "GETDATE()"
    }

    fn true_literal(&self) -> &str {
        "1"
    }

    fn false_literal(&self) -> &str {
        "0"
    }

    fn auto_increment_clause(&self) -> &str {
        "IDENTITY"
    }
}
