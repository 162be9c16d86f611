//! Literal SQL change.

use async_trait::async_trait;

use crate::core::descriptor::DialectDescriptor;
use crate::core::schema::{DatabaseObjectRef, DeletedObjects};
use crate::core::statement::{Applicability, Statement};
use crate::error::Result;
use crate::introspect::SnapshotProvider;

use super::{Change, ValidationResult};

const CHANGE_NAME: &str = "sql";

/// Run literal SQL, optionally restricted to named dialects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSql {
    pub sql: String,

    /// Dialect names the SQL applies to; empty means every dialect.
    pub dbms: Vec<String>,
}

impl RawSql {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            dbms: Vec::new(),
        }
    }

    pub fn for_dbms(mut self, dbms: impl Into<String>) -> Self {
        self.dbms.push(dbms.into());
        self
    }

    fn applicability(&self) -> Applicability {
        if self.dbms.is_empty() {
            Applicability::Any
        } else {
            Applicability::Dialects(self.dbms.clone())
        }
    }
}

#[async_trait]
impl Change for RawSql {
    fn change_name(&self) -> &str {
        CHANGE_NAME
    }

    fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        result.require("sql", &self.sql);
        result
    }

    async fn generate_statements_after(
        &self,
        db: &DialectDescriptor,
        _provider: &SnapshotProvider,
        _prior: &DeletedObjects,
    ) -> Result<Vec<Statement>> {
        self.validate().into_result(CHANGE_NAME)?;

        let statement = Statement::Raw {
            sql: self.sql.trim().to_string(),
            applies_to: self.applicability(),
        };
        if !statement.supports(db) {
            return Ok(Vec::new());
        }
        Ok(vec![statement])
    }

    fn confirmation_message(&self) -> String {
        "Custom SQL executed".to_string()
    }

    fn affected_objects(&self) -> Vec<DatabaseObjectRef> {
        Vec::new()
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
    async fn test_raw_sql_for_matching_dbms() {
        let catalog = DialectCatalog::with_builtins();
        let change = RawSql::new(" UPDATE settings SET v = 1 ").for_dbms("mssql");

        let mssql = catalog.descriptor("sqlserver", None);
        let statements = change.generate_statements(&mssql, &provider()).await.unwrap();
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].to_sql(&mssql).unwrap(), "UPDATE settings SET v = 1");

        let pg = catalog.descriptor("postgres", None);
        assert!(change
            .generate_statements(&pg, &provider())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_raw_sql_for_dbms_alias() {
        let change = RawSql::new("UPDATE settings SET v = 1").for_dbms("sqlserver");
        let mssql = DialectCatalog::with_builtins().descriptor("mssql", None);

        let statements = change.generate_statements(&mssql, &provider()).await.unwrap();
        assert_eq!(statements.len(), 1);
    }

    #[test]
    fn test_blank_sql_invalid() {
        assert!(!RawSql::new("   ").validate().is_ok());
    }
}
