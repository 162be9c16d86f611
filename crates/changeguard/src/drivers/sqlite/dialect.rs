//! SQLite SQL dialect (Strategy pattern).
//!
//! SQLite cannot add or drop foreign keys on an existing table, so the
//! foreign key capability is not declared and FK drops become no-ops.

use crate::core::identifier::quote_double;
use crate::core::traits::{Capability, Dialect, LogicalType};

/// SQLite dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Create a new SQLite dialect instance.
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn quote_ident(&self, name: &str) -> String {
        quote_double(name)
    }

    fn supports(&self, _capability: Capability) -> bool {
        false
    }

    fn type_name(&self, logical: LogicalType) -> &str {
        match logical {
            LogicalType::Boolean => "BOOLEAN",
            LogicalType::Currency => "REAL",
            LogicalType::Uuid => "TEXT",
            LogicalType::Clob => "TEXT",
            LogicalType::Blob => "BLOB",
            LogicalType::DateTime => "TEXT",
        }
    }

    fn true_literal(&self) -> &str {
        "1"
    }

    fn false_literal(&self) -> &str {
        "0"
    }

    fn auto_increment_clause(&self) -> &str {
        "AUTOINCREMENT"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supports_nothing() {
        let dialect = SqliteDialect::new();
        assert!(!dialect.supports(Capability::ForeignKeys));
        assert!(!dialect.supports(Capability::CascadeViaTriggers));
        assert!(!dialect.supports(Capability::DropTableCascade));
        assert_eq!(dialect.cascade_constraints_clause(), None);
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(SqliteDialect::new().quote_ident("users"), "\"users\"");
    }
}
