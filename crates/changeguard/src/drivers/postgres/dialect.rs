//! PostgreSQL SQL dialect (Strategy pattern).

use crate::core::identifier::quote_double;
use crate::core::traits::{Capability, Dialect, LogicalType};

/// PostgreSQL dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Create a new PostgreSQL dialect instance.
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &str {
        "postgres"
    }

    fn quote_ident(&self, name: &str) -> String {
        quote_double(name)
    }

    fn supports(&self, capability: Capability) -> bool {
        matches!(
            capability,
            Capability::ForeignKeys
                | Capability::Sequences
                | Capability::DropTableCascade
                | Capability::Tablespaces
                | Capability::InitiallyDeferrableColumns
        )
    }

    fn type_name(&self, logical: LogicalType) -> &str {
        match logical {
            LogicalType::Boolean => "BOOLEAN",
            LogicalType::Currency => "DECIMAL",
            LogicalType::Uuid => "CHAR(36)",
            LogicalType::Clob => "TEXT",
            LogicalType::Blob => "BYTEA",
            LogicalType::DateTime => "TIMESTAMP WITH TIME ZONE",
        }
    }

    fn current_datetime_function(&self) -> &str {
        "NOW()"
    }

    fn auto_increment_clause(&self) -> &str {
        "SERIAL"
    }
}
