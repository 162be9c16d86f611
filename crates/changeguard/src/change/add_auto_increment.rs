//! Convert an existing column to auto-increment.

use async_trait::async_trait;

use crate::core::descriptor::DialectDescriptor;
use crate::core::schema::{DatabaseObjectRef, DeletedObjects};
use crate::core::statement::Statement;
use crate::core::traits::Capability;
use crate::error::{ChangeError, Result};
use crate::introspect::SnapshotProvider;

use super::{Change, ValidationResult};

const CHANGE_NAME: &str = "addAutoIncrement";

/// Make an existing column auto-increment.
///
/// There is no no-op fallback: dialects without the capability reject the
/// change with `Unsupported`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddAutoIncrement {
    pub schema: Option<String>,
    pub table: String,
    pub column: String,
    pub column_data_type: String,
}

impl AddAutoIncrement {
    pub fn new(
        table: impl Into<String>,
        column: impl Into<String>,
        column_data_type: impl Into<String>,
    ) -> Self {
        Self {
            schema: None,
            table: table.into(),
            column: column.into(),
            column_data_type: column_data_type.into(),
        }
    }
}

#[async_trait]
impl Change for AddAutoIncrement {
    fn change_name(&self) -> &str {
        CHANGE_NAME
    }

    fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        result
            .require("tableName", &self.table)
            .require("columnName", &self.column)
            .require("columnDataType", &self.column_data_type)
            .require_if_present("schemaName", self.schema.as_deref());
        result
    }

    async fn generate_statements_after(
        &self,
        db: &DialectDescriptor,
        _provider: &SnapshotProvider,
        _prior: &DeletedObjects,
    ) -> Result<Vec<Statement>> {
        self.validate().into_result(CHANGE_NAME)?;

        if !db.supports(Capability::AddAutoIncrement) {
            return Err(ChangeError::unsupported(CHANGE_NAME, db.name()));
        }

        Ok(vec![Statement::AddAutoIncrement {
            schema: self.schema.clone(),
            table: self.table.clone(),
            column: self.column.clone(),
            data_type: self.column_data_type.clone(),
        }])
    }

    fn confirmation_message(&self) -> String {
        format!("Auto-increment added to {}.{}", self.table, self.column)
    }

    fn affected_objects(&self) -> Vec<DatabaseObjectRef> {
        vec![DatabaseObjectRef::column(
            self.table.clone(),
            self.column.clone(),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::cascade::{TriggerConvention, DEFAULT_TABLE_PREFIX};
    use crate::core::catalog::DialectCatalog;
    use crate::introspect::MemoryIntrospector;

    fn provider() -> SnapshotProvider {
        SnapshotProvider::new(
            Arc::new(MemoryIntrospector::new()),
            TriggerConvention::new(DEFAULT_TABLE_PREFIX).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_mysql_modify() {
        let db = DialectCatalog::with_builtins().descriptor("mariadb", None);
        let statements = AddAutoIncrement::new("users", "id", "BIGINT")
            .generate_statements(&db, &provider())
            .await
            .unwrap();
        assert_eq!(
            statements[0].to_sql(&db).unwrap(),
            "ALTER TABLE `users` MODIFY `id` BIGINT AUTO_INCREMENT"
        );
    }

    #[tokio::test]
    async fn test_standard_identity() {
        let db = DialectCatalog::with_builtins().descriptor("informix", None);
        let statements = AddAutoIncrement::new("users", "id", "INT")
            .generate_statements(&db, &provider())
            .await
            .unwrap();
        assert_eq!(
            statements[0].to_sql(&db).unwrap(),
            "ALTER TABLE \"users\" ALTER COLUMN \"id\" INT GENERATED BY DEFAULT AS IDENTITY"
        );
    }

    #[tokio::test]
    async fn test_unsupported_dialects() {
        let catalog = DialectCatalog::with_builtins();
        let change = AddAutoIncrement::new("users", "id", "INT");
        for name in ["mssql", "postgres", "sqlite", "derby"] {
            let db = catalog.descriptor(name, None);
            let err = change.generate_statements(&db, &provider()).await.unwrap_err();
            assert!(
                matches!(err, ChangeError::Unsupported { .. }),
                "{} should reject addAutoIncrement",
                name
            );
        }
    }

    #[test]
    fn test_validate_requires_data_type() {
        let result = AddAutoIncrement::new("users", "id", "").validate();
        assert_eq!(result.failures()[0].field, "columnDataType");
    }
}
