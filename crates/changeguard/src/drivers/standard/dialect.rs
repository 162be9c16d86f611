//! Standard SQL dialect, used for unrecognized database identities.

use crate::core::identifier::quote_double;
use crate::core::traits::{Capability, Dialect};

/// Most standard-compliant behavior: every capability except trigger-managed
/// cascades, and the default type table.
#[derive(Debug, Clone, Default)]
pub struct StandardDialect;

impl StandardDialect {
    /// Create a new standard SQL dialect instance.
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for StandardDialect {
    fn name(&self) -> &str {
        "standard"
    }

    fn quote_ident(&self, name: &str) -> String {
        quote_double(name)
    }

    fn supports(&self, capability: Capability) -> bool {
        !matches!(capability, Capability::CascadeViaTriggers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::LogicalType;

    #[test]
    fn test_standard_defaults() {
        let dialect = StandardDialect::new();
        assert!(dialect.supports(Capability::ForeignKeys));
        assert!(dialect.supports(Capability::AddAutoIncrement));
        assert!(!dialect.supports(Capability::CascadeViaTriggers));
        assert_eq!(dialect.type_name(LogicalType::Boolean), "BOOLEAN");
        assert_eq!(
            dialect.add_auto_increment_sql("\"t\"", "\"id\"", "INT"),
            "ALTER TABLE \"t\" ALTER COLUMN \"id\" INT GENERATED BY DEFAULT AS IDENTITY"
        );
    }
}
