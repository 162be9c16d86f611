//! Core traits for dialect-aware change generation.
//!
//! - [`Dialect`]: SQL syntax and capability strategy for one database engine
//! - [`Introspector`]: reads live schema facts from the target database
//!
//! Changes never test for a concrete dialect type. They ask the dialect
//! whether it [`supports`](Dialect::supports) a [`Capability`], so adding a
//! database means declaring its capabilities, not editing every change.

use async_trait::async_trait;

use crate::error::Result;

use super::schema::{ForeignKey, Snapshot, Table, TriggerHeader};

/// Operations a dialect may or may not be able to express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Foreign key constraints exist at all.
    ForeignKeys,
    /// Cascading deletes are implemented by hand-authored `INSTEAD OF DELETE`
    /// triggers that must be repaired when referencing objects disappear.
    CascadeViaTriggers,
    /// Sequence objects.
    Sequences,
    /// Turning an existing column into an auto-increment column.
    AddAutoIncrement,
    /// `DROP TABLE ... CASCADE` style constraint cascading.
    DropTableCascade,
    /// Tablespace clauses.
    Tablespaces,
    /// `INITIALLY DEFERRED` constraint columns.
    InitiallyDeferrableColumns,
}

/// Dialect-neutral type names mapped by [`Dialect::type_name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalType {
    Boolean,
    Currency,
    Uuid,
    Clob,
    Blob,
    DateTime,
}

/// SQL syntax strategy for different database engines.
///
/// Every method with a default returns the standard-SQL behavior, so a
/// dialect only overrides what it does differently.
pub trait Dialect: Send + Sync {
    /// Get the dialect identifier (e.g., "mssql", "postgres").
    fn name(&self) -> &str;

    /// Quote an identifier (table name, column name, etc.).
    ///
    /// - MSSQL: `[identifier]`
    /// - PostgreSQL: `"identifier"`
    fn quote_ident(&self, name: &str) -> String;

    /// Whether this dialect can express the given operation.
    fn supports(&self, capability: Capability) -> bool;

    /// Native type name for a logical type.
    fn type_name(&self, logical: LogicalType) -> &str {
        match logical {
            LogicalType::Boolean => "BOOLEAN",
            LogicalType::Currency => "DECIMAL",
            LogicalType::Uuid => "CHAR(36)",
            LogicalType::Clob => "CLOB",
            LogicalType::Blob => "BLOB",
            LogicalType::DateTime => "TIMESTAMP",
        }
    }

    /// Function returning the current timestamp.
    fn current_datetime_function(&self) -> &str {
        "CURRENT_TIMESTAMP"
    }

    /// Literal for boolean true.
    fn true_literal(&self) -> &str {
        "TRUE"
    }

    /// Literal for boolean false.
    fn false_literal(&self) -> &str {
        "FALSE"
    }

    /// Column clause declaring an auto-increment column.
    fn auto_increment_clause(&self) -> &str {
        "GENERATED BY DEFAULT AS IDENTITY"
    }

    /// Clause following `ALTER TABLE <t>` when dropping a foreign key.
    fn drop_foreign_key_clause(&self) -> &str {
        "DROP CONSTRAINT"
    }

    /// Suffix appended to `DROP TABLE` when constraints should cascade.
    ///
    /// `None` when the dialect has no such clause.
    fn cascade_constraints_clause(&self) -> Option<&str> {
        if self.supports(Capability::DropTableCascade) {
            Some("CASCADE")
        } else {
            None
        }
    }

    /// Build the statement converting a column to auto-increment.
    ///
    /// Only called when [`Capability::AddAutoIncrement`] is supported.
    fn add_auto_increment_sql(&self, table: &str, column: &str, data_type: &str) -> String {
        format!(
            "ALTER TABLE {} ALTER COLUMN {} {} {}",
            table,
            column,
            data_type,
            self.auto_increment_clause()
        )
    }
}

/// Read schema facts from a live database.
///
/// Each method is a single bounded query, so a timeout imposed by the caller
/// on the underlying connection behaves predictably.
#[async_trait]
pub trait Introspector: Send + Sync {
    /// List base tables with their columns and primary keys.
    ///
    /// `schema` of `None` means the connection's default schema.
    async fn list_tables(&self, schema: Option<&str>) -> Result<Vec<Table>>;

    /// Load the foreign keys owned by a table.
    async fn foreign_keys(&self, table: &Table) -> Result<Vec<ForeignKey>>;

    /// List every trigger as (trigger name, owning table).
    async fn list_triggers(&self) -> Result<Vec<TriggerHeader>>;

    /// Fetch a trigger's source text, one row per line in server order.
    ///
    /// Returns an empty vector when the server has no text for the trigger.
    async fn trigger_text_lines(&self, trigger_name: &str) -> Result<Vec<String>>;

    /// Capture a point-in-time snapshot of tables and foreign keys.
    ///
    /// Template method over [`list_tables`](Self::list_tables) and
    /// [`foreign_keys`](Self::foreign_keys). Trigger text is not read here;
    /// the snapshot fetches it lazily on first use.
    async fn capture_snapshot(&self, schema: Option<&str>) -> Result<Snapshot> {
        let tables = self.list_tables(schema).await?;
        let mut foreign_keys = Vec::new();
        for table in &tables {
            foreign_keys.extend(self.foreign_keys(table).await?);
        }
        Ok(Snapshot::new(tables, foreign_keys))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Minimal;

    impl Dialect for Minimal {
        fn name(&self) -> &str {
            "minimal"
        }

        fn quote_ident(&self, name: &str) -> String {
            name.to_string()
        }

        fn supports(&self, capability: Capability) -> bool {
            matches!(capability, Capability::DropTableCascade)
        }
    }

    #[test]
    fn test_default_type_names() {
        let d = Minimal;
        assert_eq!(d.type_name(LogicalType::Boolean), "BOOLEAN");
        assert_eq!(d.type_name(LogicalType::DateTime), "TIMESTAMP");
        assert_eq!(d.type_name(LogicalType::Uuid), "CHAR(36)");
    }

    #[test]
    fn test_default_clauses() {
        let d = Minimal;
        assert_eq!(d.drop_foreign_key_clause(), "DROP CONSTRAINT");
        assert_eq!(d.cascade_constraints_clause(), Some("CASCADE"));
        assert_eq!(
            d.add_auto_increment_sql("t", "id", "INT"),
            "ALTER TABLE t ALTER COLUMN id INT GENERATED BY DEFAULT AS IDENTITY"
        );
    }
}
