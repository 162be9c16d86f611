//! Apache Derby SQL dialect (Strategy pattern).

use crate::core::identifier::quote_double;
use crate::core::traits::{Capability, Dialect, LogicalType};

/// Apache Derby dialect implementation.
///
/// Derby has no boolean column type before 10.7, so booleans are stored as
/// `SMALLINT` with `1`/`0` literals.
#[derive(Debug, Clone, Default)]
pub struct DerbyDialect;

impl DerbyDialect {
    /// Create a new Derby dialect instance.
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for DerbyDialect {
    fn name(&self) -> &str {
        "derby"
    }

    fn quote_ident(&self, name: &str) -> String {
        quote_double(name)
    }

    fn supports(&self, capability: Capability) -> bool {
        matches!(capability, Capability::ForeignKeys)
    }

    fn type_name(&self, logical: LogicalType) -> &str {
        match logical {
            LogicalType::Boolean => "SMALLINT",
            LogicalType::Currency => "DECIMAL",
            LogicalType::Uuid => "CHAR(36)",
            LogicalType::Clob => "CLOB",
            LogicalType::Blob => "BLOB",
            LogicalType::DateTime => "TIMESTAMP",
        }
    }

    fn true_literal(&self) -> &str {
        "1"
    }

    fn false_literal(&self) -> &str {
        "0"
    }
}
