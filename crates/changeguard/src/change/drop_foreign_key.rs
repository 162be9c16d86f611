//! Drop a foreign key constraint.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::core::descriptor::DialectDescriptor;
use crate::core::schema::{DatabaseObjectRef, DeletedObjects};
use crate::core::statement::Statement;
use crate::core::traits::Capability;
use crate::error::Result;
use crate::introspect::SnapshotProvider;

use super::{Change, ValidationResult};

const CHANGE_NAME: &str = "dropForeignKeyConstraint";

/// Drop a foreign key constraint.
///
/// - Dialects without foreign keys: no statements
/// - Dialects with trigger-managed cascades: repair the delete trigger on the
///   referenced table first, then drop the constraint
/// - Everything else: a single drop statement
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropForeignKeyConstraint {
    pub base_table_schema: Option<String>,
    pub base_table: String,
    pub constraint_name: String,
}

impl DropForeignKeyConstraint {
    pub fn new(base_table: impl Into<String>, constraint_name: impl Into<String>) -> Self {
        Self {
            base_table_schema: None,
            base_table: base_table.into(),
            constraint_name: constraint_name.into(),
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.base_table_schema = Some(schema.into());
        self
    }

    async fn trigger_repairs(
        &self,
        provider: &SnapshotProvider,
        prior: &DeletedObjects,
    ) -> Result<Vec<Statement>> {
        let snapshot = provider.snapshot().await?;
        let Some(fk) = snapshot.foreign_key(&self.constraint_name, &self.base_table) else {
            warn!(
                "Foreign key {} on {} not found in snapshot; skipping trigger repair",
                self.constraint_name, self.base_table
            );
            return Ok(Vec::new());
        };

        let engine = provider.trigger_engine();
        let Some(trigger) = engine
            .delete_trigger_for_table(provider.introspector(), &fk.referenced_table)
            .await?
        else {
            debug!("No delete trigger on {}", fk.referenced_table);
            return Ok(Vec::new());
        };
        if prior.contains_trigger(&trigger.name, &trigger.table) {
            debug!("Trigger {} is already being deleted", trigger.name);
            return Ok(Vec::new());
        }

        let deleted = DeletedObjects::single(DatabaseObjectRef::foreign_key(
            fk.name.clone(),
            fk.owning_table.clone(),
        ));
        let repairs = engine
            .validate_trigger_after(&trigger, &snapshot, prior, &deleted)?
            .into_iter()
            .collect();
        Ok(engine.repair_statements(repairs))
    }
}

#[async_trait]
impl Change for DropForeignKeyConstraint {
    fn change_name(&self) -> &str {
        CHANGE_NAME
    }

    fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        result
            .require("baseTableName", &self.base_table)
            .require("constraintName", &self.constraint_name)
            .require_if_present("baseTableSchemaName", self.base_table_schema.as_deref());
        result
    }

    async fn generate_statements_after(
        &self,
        db: &DialectDescriptor,
        provider: &SnapshotProvider,
        prior: &DeletedObjects,
    ) -> Result<Vec<Statement>> {
        self.validate().into_result(CHANGE_NAME)?;

        if !db.supports(Capability::ForeignKeys) {
            return Ok(Vec::new());
        }

        let mut statements = if db.supports(Capability::CascadeViaTriggers) {
            self.trigger_repairs(provider, prior).await?
        } else {
            Vec::new()
        };

        statements.push(Statement::DropForeignKey {
            schema: self.base_table_schema.clone(),
            table: self.base_table.clone(),
            constraint: self.constraint_name.clone(),
        });
        Ok(statements)
    }

    fn confirmation_message(&self) -> String {
        format!(
            "Foreign key {} dropped from {}",
            self.constraint_name, self.base_table
        )
    }

    fn affected_objects(&self) -> Vec<DatabaseObjectRef> {
        vec![DatabaseObjectRef::foreign_key(
            self.constraint_name.clone(),
            self.base_table.clone(),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::cascade::{TriggerConvention, DEFAULT_TABLE_PREFIX};
    use crate::core::catalog::DialectCatalog;
    use crate::core::schema::{ForeignKey, Table};
    use crate::error::ChangeError;
    use crate::introspect::MemoryIntrospector;

    fn provider(memory: MemoryIntrospector) -> SnapshotProvider {
        SnapshotProvider::new(
            Arc::new(memory),
            TriggerConvention::new(DEFAULT_TABLE_PREFIX).unwrap(),
        )
    }

    fn folder_schema() -> MemoryIntrospector {
        MemoryIntrospector::new()
            .with_table(
                Table::new("dbo", "cxml_folder")
                    .with_column("id", "varchar")
                    .with_primary_key("PK_cxml_folder", &["id"]),
            )
            .with_table(
                Table::new("dbo", "cxml_page")
                    .with_column("id", "varchar")
                    .with_column("folderId", "varchar"),
            )
            .with_table(
                Table::new("dbo", "cxml_file")
                    .with_column("id", "varchar")
                    .with_column("parentFolderId", "varchar"),
            )
            .with_foreign_key(ForeignKey::new(
                "FK_page_folder",
                "cxml_page",
                "folderId",
                "cxml_folder",
                "id",
            ))
            .with_foreign_key(ForeignKey::new(
                "FK_file_folder",
                "cxml_file",
                "parentFolderId",
                "cxml_folder",
                "id",
            ))
            .with_trigger(
                "TRG_CXML_FOLDER_DELETE",
                "cxml_folder",
                "CREATE TRIGGER TRG_CXML_FOLDER_DELETE ON cxml_folder INSTEAD OF DELETE AS \n\
                 UPDATE cxml_page SET folderId = NULL FROM cxml_page AS fktable JOIN deleted AS D ON fktable.folderId = D.id\n\
                 UPDATE cxml_file SET parentFolderId = NULL FROM cxml_file AS fktable JOIN deleted AS D ON fktable.parentFolderId = D.id\n\
                 DELETE cxml_folder FROM cxml_folder INNER JOIN deleted ON cxml_folder.id = deleted.id",
            )
    }

    #[test]
    fn test_validate_requires_names() {
        let change = DropForeignKeyConstraint::new("", "");
        let result = change.validate();
        assert_eq!(result.failures().len(), 2);
        assert_eq!(result.failures()[0].field, "baseTableName");
    }

    #[tokio::test]
    async fn test_no_foreign_key_support_is_noop() {
        let db = DialectCatalog::with_builtins().descriptor("sqlite", None);
        let change = DropForeignKeyConstraint::new("cxml_page", "FK_page_folder");
        let provider = provider(folder_schema());

        let statements = change.generate_statements(&db, &provider).await.unwrap();
        assert!(statements.is_empty());
        assert!(!provider.is_captured().await);
    }

    #[tokio::test]
    async fn test_plain_drop_without_triggers() {
        let db = DialectCatalog::with_builtins().descriptor("postgres", None);
        let change = DropForeignKeyConstraint::new("orders", "fk_orders_customer");
        let provider = provider(MemoryIntrospector::new());

        let statements = change.generate_statements(&db, &provider).await.unwrap();
        assert_eq!(statements.len(), 1);
        assert_eq!(
            statements[0].to_sql(&db).unwrap(),
            "ALTER TABLE \"orders\" DROP CONSTRAINT fk_orders_customer"
        );
    }

    #[tokio::test]
    async fn test_mssql_repairs_referenced_trigger() {
        let db = DialectCatalog::with_builtins().descriptor("mssql", Some("dbo"));
        let change = DropForeignKeyConstraint::new("cxml_page", "FK_page_folder");
        let provider = provider(folder_schema());

        let statements = change.generate_statements(&db, &provider).await.unwrap();
        assert_eq!(statements.len(), 3);
        assert_eq!(
            statements[0],
            Statement::DropTrigger {
                name: "TRG_CXML_FOLDER_DELETE".to_string()
            }
        );

        let create = statements[1].to_sql(&db).unwrap();
        assert!(create.contains("UPDATE cxml_file SET parentFolderId = NULL"));
        assert!(!create.contains("cxml_page"));
        assert_eq!(
            statements[2].to_sql(&db).unwrap(),
            "ALTER TABLE [dbo].[cxml_page] DROP CONSTRAINT FK_page_folder"
        );
    }

    #[tokio::test]
    async fn test_repair_after_earlier_foreign_key_drop() {
        let db = DialectCatalog::with_builtins().descriptor("mssql", None);
        let change = DropForeignKeyConstraint::new("cxml_page", "FK_page_folder");
        let provider = provider(folder_schema());
        let prior =
            DeletedObjects::single(DatabaseObjectRef::foreign_key("FK_file_folder", "cxml_file"));

        let statements = change
            .generate_statements_after(&db, &provider, &prior)
            .await
            .unwrap();
        assert_eq!(statements.len(), 3);
        assert_eq!(
            statements[1].to_sql(&db).unwrap(),
            "CREATE TRIGGER TRG_CXML_FOLDER_DELETE ON cxml_folder INSTEAD OF DELETE AS \
             DELETE cxml_folder FROM cxml_folder INNER JOIN deleted ON cxml_folder.id = deleted.id"
        );
    }

    #[tokio::test]
    async fn test_no_repair_when_trigger_table_already_dropped() {
        let db = DialectCatalog::with_builtins().descriptor("mssql", None);
        let change = DropForeignKeyConstraint::new("cxml_page", "FK_page_folder");
        let provider = provider(folder_schema());
        let prior = DeletedObjects::single(DatabaseObjectRef::table(None, "cxml_folder"));

        let statements = change
            .generate_statements_after(&db, &provider, &prior)
            .await
            .unwrap();
        assert_eq!(statements.len(), 1);
        assert!(matches!(statements[0], Statement::DropForeignKey { .. }));
    }

    #[tokio::test]
    async fn test_missing_foreign_key_only_drops() {
        let db = DialectCatalog::with_builtins().descriptor("mssql", None);
        let change = DropForeignKeyConstraint::new("cxml_page", "FK_unknown");
        let provider = provider(folder_schema());

        let statements = change.generate_statements(&db, &provider).await.unwrap();
        assert_eq!(statements.len(), 1);
        assert!(matches!(statements[0], Statement::DropForeignKey { .. }));
    }

    #[tokio::test]
    async fn test_invalid_definition_is_error() {
        let db = DialectCatalog::with_builtins().descriptor("mssql", None);
        let change = DropForeignKeyConstraint::new("cxml_page", " ");
        let provider = provider(folder_schema());

        let err = change.generate_statements(&db, &provider).await.unwrap_err();
        assert!(matches!(err, ChangeError::Definition { .. }));
    }

    #[test]
    fn test_affected_objects() {
        let change = DropForeignKeyConstraint::new("cxml_page", "FK_page_folder");
        assert_eq!(
            change.affected_objects(),
            vec![DatabaseObjectRef::foreign_key("FK_page_folder", "cxml_page")]
        );
        assert_eq!(
            change.confirmation_message(),
            "Foreign key FK_page_folder dropped from cxml_page"
        );
    }
}
