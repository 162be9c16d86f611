//! MySQL/MariaDB SQL dialect (Strategy pattern).
//!
//! Compatible with MySQL 5.7+, 8.0+, and MariaDB 10.2+.

use crate::core::identifier::quote_backtick;
use crate::core::traits::{Capability, Dialect, LogicalType};

/// MySQL/MariaDB dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct MysqlDialect;

impl MysqlDialect {
    /// Create a new MySQL dialect instance.
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for MysqlDialect {
    fn name(&self) -> &str {
        "mysql"
    }

    fn quote_ident(&self, name: &str) -> String {
        quote_backtick(name)
    }

    fn supports(&self, capability: Capability) -> bool {
        matches!(
            capability,
            Capability::ForeignKeys | Capability::AddAutoIncrement | Capability::DropTableCascade
        )
    }

    fn type_name(&self, logical: LogicalType) -> &str {
        match logical {
            LogicalType::Boolean => "TINYINT(1)",
            LogicalType::Currency => "DECIMAL",
            LogicalType::Uuid => "CHAR(36)",
            LogicalType::Clob => "TEXT",
            LogicalType::Blob => "BLOB",
            LogicalType::DateTime => "DATETIME",
        }
    }

    fn current_datetime_function(&self) -> &str {
        "NOW()"
    }

    fn true_literal(&self) -> &str {
        "1"
    }

    fn false_literal(&self) -> &str {
        "0"
    }

    fn auto_increment_clause(&self) -> &str {
        "AUTO_INCREMENT"
    }

    fn drop_foreign_key_clause(&self) -> &str {
        "DROP FOREIGN KEY"
    }

    // MySQL redefines the column instead of altering it in place.
    fn add_auto_increment_sql(&self, table: &str, column: &str, data_type: &str) -> String {
        format!(
            "ALTER TABLE {} MODIFY {} {} {}",
            table,
            column,
            data_type,
            self.auto_increment_clause()
        )
    }
}
