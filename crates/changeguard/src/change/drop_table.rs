//! Drop a table.

use async_trait::async_trait;
use tracing::warn;

use crate::core::descriptor::DialectDescriptor;
use crate::core::schema::{DatabaseObjectRef, DeletedObjects};
use crate::core::statement::Statement;
use crate::core::traits::Capability;
use crate::error::Result;
use crate::introspect::SnapshotProvider;

use super::{Change, ValidationResult};

const CHANGE_NAME: &str = "dropTable";

/// Drop a table, repairing every cascade trigger that referenced it on
/// dialects with trigger-managed cascades.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropTable {
    pub schema: Option<String>,
    pub table: String,

    /// Append the dialect's cascade-constraints clause. Unset means `false`.
    pub cascade_constraints: Option<bool>,
}

impl DropTable {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_cascade_constraints(mut self, cascade: bool) -> Self {
        self.cascade_constraints = Some(cascade);
        self
    }

    fn effective_cascade(&self, db: &DialectDescriptor) -> bool {
        let requested = self.cascade_constraints.unwrap_or(false);
        if requested && !db.supports(Capability::DropTableCascade) {
            warn!(
                "{} cannot cascade constraints when dropping {}; ignoring cascadeConstraints",
                db.name(),
                self.table
            );
            return false;
        }
        requested
    }
}

#[async_trait]
impl Change for DropTable {
    fn change_name(&self) -> &str {
        CHANGE_NAME
    }

    fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        result
            .require("tableName", &self.table)
            .require_if_present("schemaName", self.schema.as_deref());
        result
    }

    async fn generate_statements_after(
        &self,
        db: &DialectDescriptor,
        provider: &SnapshotProvider,
        prior: &DeletedObjects,
    ) -> Result<Vec<Statement>> {
        self.validate().into_result(CHANGE_NAME)?;

        let mut statements = if db.supports(Capability::CascadeViaTriggers) {
            let deleted: DeletedObjects = self.affected_objects().into_iter().collect();
            provider.validate_all_triggers_after(prior, &deleted).await?
        } else {
            Vec::new()
        };

        statements.push(Statement::DropTable {
            schema: self.schema.clone(),
            table: self.table.clone(),
            cascade_constraints: self.effective_cascade(db),
        });
        Ok(statements)
    }

    fn confirmation_message(&self) -> String {
        format!("Table {} dropped", self.table)
    }

    fn affected_objects(&self) -> Vec<DatabaseObjectRef> {
        vec![DatabaseObjectRef::table(
            self.schema.as_deref(),
            self.table.clone(),
        )]
    }
}
