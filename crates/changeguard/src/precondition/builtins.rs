//! Built-in preconditions.

use crate::core::descriptor::DialectDescriptor;
use crate::core::schema::Snapshot;
use crate::error::{ChangeError, Result};

use super::CustomPrecondition;

/// Passes when the snapshot contains the named table.
#[derive(Debug, Clone, Default)]
pub struct TableExistsPrecondition {
    pub schema_name: Option<String>,
    pub table_name: Option<String>,
}

impl CustomPrecondition for TableExistsPrecondition {
    fn set_param(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "tableName" => self.table_name = Some(value.to_string()),
            "schemaName" => self.schema_name = Some(value.to_string()),
            other => {
                return Err(ChangeError::PreconditionError(format!(
                    "unknown parameter {}",
                    other
                )))
            }
        }
        Ok(())
    }

    fn check(&self, db: &DialectDescriptor, snapshot: &Snapshot) -> Result<()> {
        let table = self
            .table_name
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ChangeError::PreconditionError("tableName is required".to_string()))?;
        let schema = self.schema_name.as_deref().or(db.default_schema());

        let found = snapshot.tables().iter().any(|t| {
            t.name.eq_ignore_ascii_case(table)
                && schema.map_or(true, |s| t.schema.eq_ignore_ascii_case(s))
        });
        if found {
            Ok(())
        } else {
            Err(ChangeError::PreconditionFailed(format!(
                "Table {} does not exist",
                table
            )))
        }
    }
}

/// Passes when the target dialect is one of a comma-separated list.
#[derive(Debug, Clone, Default)]
pub struct DbmsPrecondition {
    pub dbms_type: Option<String>,
}

impl CustomPrecondition for DbmsPrecondition {
    fn set_param(&mut self, name: &str, value: &str) -> Result<()> {
        if name != "type" {
            return Err(ChangeError::PreconditionError(format!(
                "unknown parameter {}",
                name
            )));
        }
        self.dbms_type = Some(value.to_string());
        Ok(())
    }

    fn check(&self, db: &DialectDescriptor, _snapshot: &Snapshot) -> Result<()> {
        let expected = self
            .dbms_type
            .as_deref()
            .ok_or_else(|| ChangeError::PreconditionError("type is required".to_string()))?;

        if expected.split(',').any(|name| db.is_named(name.trim())) {
            Ok(())
        } else {
            Err(ChangeError::PreconditionFailed(format!(
                "DBMS Precondition failed: expected {}, got {}",
                expected,
                db.name()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::DialectCatalog;
    use crate::core::schema::Table;

    fn snapshot() -> Snapshot {
        Snapshot::new(vec![Table::new("dbo", "cxml_folder")], Vec::new())
    }

    #[test]
    fn test_table_exists() {
        let db = DialectCatalog::with_builtins().descriptor("mssql", Some("dbo"));
        let mut check = TableExistsPrecondition::default();
        check.set_param("tableName", "CXML_FOLDER").unwrap();
        assert!(check.check(&db, &snapshot()).is_ok());

        check.set_param("schemaName", "audit").unwrap();
        assert!(matches!(
            check.check(&db, &snapshot()),
            Err(ChangeError::PreconditionFailed(_))
        ));
    }

    #[test]
    fn test_table_exists_requires_name() {
        let db = DialectCatalog::with_builtins().descriptor("mssql", None);
        assert!(matches!(
            TableExistsPrecondition::default().check(&db, &snapshot()),
            Err(ChangeError::PreconditionError(_))
        ));
    }

    #[test]
    fn test_dbms() {
        let db = DialectCatalog::with_builtins().descriptor("sqlserver", None);
        let mut check = DbmsPrecondition::default();
        check.set_param("type", "postgres, mssql").unwrap();
        assert!(check.check(&db, &snapshot()).is_ok());

        check.set_param("type", "mysql").unwrap();
        let err = check.check(&db, &snapshot()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Precondition failed: DBMS Precondition failed: expected mysql, got mssql"
        );
        assert!(check.set_param("version", "1").is_err());
    }

    #[test]
    fn test_dbms_accepts_alias() {
        let db = DialectCatalog::with_builtins().descriptor("mssql", None);
        let mut check = DbmsPrecondition::default();
        check.set_param("type", "sqlserver").unwrap();
        assert!(check.check(&db, &snapshot()).is_ok());
    }
}
