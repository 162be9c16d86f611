//! Changesets and the execution ledger.

use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::change::{Change, ValidationResult};
use crate::core::descriptor::DialectDescriptor;
use crate::core::schema::DeletedObjects;
use crate::core::statement::Statement;
use crate::error::Result;
use crate::introspect::SnapshotProvider;
use crate::precondition::{CustomPreconditionWrapper, PreconditionRegistry};

/// Changeset identity: `(id, author, changelog path)`.
///
/// `id` and `author` compare exactly; the changelog path compares ignoring
/// case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeSetId {
    pub id: String,
    pub author: String,
    pub changelog_path: String,
}

impl ChangeSetId {
    pub fn new(
        id: impl Into<String>,
        author: impl Into<String>,
        changelog_path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            author: author.into(),
            changelog_path: changelog_path.into(),
        }
    }

    /// Normalized lookup key: `path::id::author` with the path lowercased.
    pub fn key(&self) -> String {
        format!(
            "{}::{}::{}",
            self.changelog_path.to_lowercase(),
            self.id,
            self.author
        )
    }
}

impl PartialEq for ChangeSetId {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.author == other.author
            && self.changelog_path.eq_ignore_ascii_case(&other.changelog_path)
    }
}

impl Eq for ChangeSetId {}

impl Hash for ChangeSetId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for ChangeSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.changelog_path, self.id, self.author)
    }
}

/// A ledger entry for a changeset that has run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RanChangeSet {
    pub identity: ChangeSetId,
    pub checksum: String,

    /// When the changeset ran; `None` for entries recorded without a time.
    pub date_executed: Option<DateTime<Utc>>,

    /// Position in execution order.
    pub order_executed: u32,
}

/// An ordered group of changes applied together.
pub struct ChangeSet {
    pub identity: ChangeSetId,
    pub changes: Vec<Box<dyn Change>>,
    pub run_always: bool,
    pub run_on_change: bool,

    /// Run contexts this changeset belongs to; empty means all.
    pub contexts: Vec<String>,

    /// Dialects this changeset targets; empty means all.
    pub dbms: Vec<String>,

    pub preconditions: Vec<CustomPreconditionWrapper>,
}

impl ChangeSet {
    pub fn new(
        id: impl Into<String>,
        author: impl Into<String>,
        changelog_path: impl Into<String>,
    ) -> Self {
        Self {
            identity: ChangeSetId::new(id, author, changelog_path),
            changes: Vec::new(),
            run_always: false,
            run_on_change: false,
            contexts: Vec::new(),
            dbms: Vec::new(),
            preconditions: Vec::new(),
        }
    }

    /// Append a change (builder style).
    pub fn with_change(mut self, change: impl Change + 'static) -> Self {
        self.changes.push(Box::new(change));
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.contexts.push(context.into());
        self
    }

    pub fn with_dbms(mut self, dbms: impl Into<String>) -> Self {
        self.dbms.push(dbms.into());
        self
    }

    pub fn with_precondition(mut self, precondition: CustomPreconditionWrapper) -> Self {
        self.preconditions.push(precondition);
        self
    }

    /// Validate every change, collecting all failures.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        for change in &self.changes {
            result.merge(change.validate());
        }
        result
    }

    /// Generate statements for every change, in order.
    ///
    /// All changes are validated before any generation starts. Each change
    /// sees the objects removed by the changes before it, so a trigger
    /// repaired twice ends up with neither removed rule.
    pub async fn generate_statements(
        &self,
        db: &DialectDescriptor,
        provider: &SnapshotProvider,
    ) -> Result<Vec<Statement>> {
        for change in &self.changes {
            change.validate().into_result(change.change_name())?;
        }

        let mut statements = Vec::new();
        let mut prior = DeletedObjects::new();
        for change in &self.changes {
            let generated = change
                .generate_statements_after(db, provider, &prior)
                .await?;
            prior.extend(change.affected_objects());
            debug!(
                "{}: {} generated {} statement(s)",
                self.identity,
                change.change_name(),
                generated.len()
            );
            statements.extend(generated);
        }
        Ok(statements)
    }

    /// Run every custom precondition against the current snapshot.
    pub async fn check_preconditions(
        &self,
        registry: &PreconditionRegistry,
        db: &DialectDescriptor,
        provider: &SnapshotProvider,
    ) -> Result<()> {
        if self.preconditions.is_empty() {
            return Ok(());
        }

        let snapshot = provider.snapshot().await?;
        for precondition in &self.preconditions {
            precondition.check(registry, db, &snapshot)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ChangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeSet")
            .field("identity", &self.identity)
            .field(
                "changes",
                &self
                    .changes
                    .iter()
                    .map(|c| c.change_name())
                    .collect::<Vec<_>>(),
            )
            .field("run_always", &self.run_always)
            .field("run_on_change", &self.run_on_change)
            .field("contexts", &self.contexts)
            .field("dbms", &self.dbms)
            .field("preconditions", &self.preconditions)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    use crate::cascade::{TriggerConvention, DEFAULT_TABLE_PREFIX};
    use crate::change::{DropTable, RawSql};
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

    #[test]
    fn test_identity_path_case_insensitive() {
        let a = ChangeSetId::new("1", "bob", "db/Changelog.xml");
        let b = ChangeSetId::new("1", "bob", "DB/changelog.XML");
        let c = ChangeSetId::new("1", "Bob", "db/changelog.xml");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.key(), "db/changelog.xml::1::bob");

        let set: HashSet<ChangeSetId> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[tokio::test]
    async fn test_generate_concatenates_in_order() {
        let db = DialectCatalog::with_builtins().descriptor("postgres", None);
        let changeset = ChangeSet::new("1", "bob", "changelog.xml")
            .with_change(RawSql::new("DELETE FROM audit"))
            .with_change(DropTable::new("audit"));

        let statements = changeset
            .generate_statements(&db, &provider(MemoryIntrospector::new()))
            .await
            .unwrap();
        let sql: Vec<String> = statements.iter().map(|s| s.to_sql(&db).unwrap()).collect();
        assert_eq!(sql, vec!["DELETE FROM audit", "DROP TABLE \"audit\""]);
    }

    #[tokio::test]
    async fn test_validation_runs_before_generation() {
        let memory = Arc::new(
            MemoryIntrospector::new().with_table(Table::new("dbo", "cxml_folder")),
        );
        let provider = SnapshotProvider::new(
            memory.clone(),
            TriggerConvention::new(DEFAULT_TABLE_PREFIX).unwrap(),
        );
        let db = DialectCatalog::with_builtins().descriptor("mssql", None);
        let changeset = ChangeSet::new("1", "bob", "changelog.xml")
            .with_change(DropTable::new("cxml_folder"))
            .with_change(DropTable::new(""));

        let err = changeset.generate_statements(&db, &provider).await.unwrap_err();
        assert!(matches!(err, ChangeError::Definition { .. }));
        assert_eq!(memory.capture_count(), 0);
        assert!(!changeset.validate().is_ok());
    }

    #[tokio::test]
    async fn test_later_change_sees_earlier_drops() {
        let folder_trigger = "UPDATE cxml_page SET folderId = NULL FROM cxml_page AS fktable JOIN deleted AS D ON fktable.folderId = D.id\n\
             UPDATE cxml_file SET parentFolderId = NULL FROM cxml_file AS fktable JOIN deleted AS D ON fktable.parentFolderId = D.id\n";
        let memory = MemoryIntrospector::new()
            .with_table(
                Table::new("dbo", "cxml_folder")
                    .with_column("id", "varchar")
                    .with_primary_key("PK_cxml_folder", &["id"]),
            )
            .with_table(Table::new("dbo", "cxml_page").with_column("folderId", "varchar"))
            .with_table(Table::new("dbo", "cxml_file").with_column("parentFolderId", "varchar"))
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
            .with_trigger("TRG_CXML_FOLDER_DELETE", "cxml_folder", folder_trigger);
        let db = DialectCatalog::with_builtins().descriptor("mssql", None);
        let changeset = ChangeSet::new("1", "bob", "changelog.xml")
            .with_change(DropTable::new("cxml_page"))
            .with_change(DropTable::new("cxml_file"));

        let statements = changeset
            .generate_statements(&db, &provider(memory))
            .await
            .unwrap();
        let sql: Vec<String> = statements.iter().map(|s| s.to_sql(&db).unwrap()).collect();
        let empty_trigger = "CREATE TRIGGER TRG_CXML_FOLDER_DELETE ON cxml_folder INSTEAD OF DELETE AS \
             DELETE cxml_folder FROM cxml_folder INNER JOIN deleted ON cxml_folder.id = deleted.id";
        assert_eq!(sql.len(), 6);
        assert_eq!(sql[3], "DROP TRIGGER TRG_CXML_FOLDER_DELETE");
        assert_eq!(sql[4], empty_trigger);
        assert_eq!(sql[5], "DROP TABLE [cxml_file]");
    }

    #[test]
    fn test_ran_changeset_serde() {
        let ran = RanChangeSet {
            identity: ChangeSetId::new("1", "bob", "changelog.xml"),
            checksum: "12345".to_string(),
            date_executed: None,
            order_executed: 1,
        };
        let yaml = serde_yaml::to_string(&ran).unwrap();
        let back: RanChangeSet = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, ran);
    }
}
