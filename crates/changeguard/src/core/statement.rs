//! Generated SQL statements.
//!
//! A [`Statement`] is an immutable value compared by content. Escaping is
//! deferred until [`Statement::to_sql`] so the same statement sequence can be
//! rendered for the descriptor it was generated against.

use crate::error::{ChangeError, Result};

use super::descriptor::DialectDescriptor;
use super::identifier::{is_plain_word, validate_identifier};
use super::schema::CascadeRule;
use super::traits::Capability;

/// Terminator used by every generated statement.
pub const END_DELIMITER: &str = ";";

/// Which dialects a statement is valid for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applicability {
    /// Every dialect.
    Any,
    /// Dialects declaring a capability.
    Requires(Capability),
    /// Dialects named in the list (case-insensitive).
    Dialects(Vec<String>),
}

impl Applicability {
    pub fn matches(&self, db: &DialectDescriptor) -> bool {
        match self {
            Applicability::Any => true,
            Applicability::Requires(capability) => db.supports(*capability),
            Applicability::Dialects(names) => names.iter().any(|n| db.is_named(n)),
        }
    }
}

/// A single generated SQL statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `ALTER TABLE <t> DROP CONSTRAINT <name>`
    DropForeignKey {
        schema: Option<String>,
        table: String,
        constraint: String,
    },

    /// `DROP TABLE <t> [CASCADE]`
    DropTable {
        schema: Option<String>,
        table: String,
        cascade_constraints: bool,
    },

    /// Convert an existing column to auto-increment.
    AddAutoIncrement {
        schema: Option<String>,
        table: String,
        column: String,
        data_type: String,
    },

    /// `DROP TRIGGER <name>`
    DropTrigger { name: String },

    /// Regenerated `INSTEAD OF DELETE` cascade trigger.
    CreateCascadeTrigger {
        table: String,
        pk_column: String,
        rules: Vec<CascadeRule>,
    },

    /// Literal SQL.
    Raw {
        sql: String,
        applies_to: Applicability,
    },
}

impl Statement {
    /// Short kind label used in errors and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Statement::DropForeignKey { .. } => "dropForeignKeyConstraint",
            Statement::DropTable { .. } => "dropTable",
            Statement::AddAutoIncrement { .. } => "addAutoIncrement",
            Statement::DropTrigger { .. } => "dropTrigger",
            Statement::CreateCascadeTrigger { .. } => "createTrigger",
            Statement::Raw { .. } => "sql",
        }
    }

    /// Applicability predicate for this statement.
    pub fn applicability(&self) -> Applicability {
        match self {
            Statement::DropForeignKey { .. } => Applicability::Requires(Capability::ForeignKeys),
            Statement::DropTable { .. } => Applicability::Any,
            Statement::AddAutoIncrement { .. } => {
                Applicability::Requires(Capability::AddAutoIncrement)
            }
            Statement::DropTrigger { .. } | Statement::CreateCascadeTrigger { .. } => {
                Applicability::Requires(Capability::CascadeViaTriggers)
            }
            Statement::Raw { applies_to, .. } => applies_to.clone(),
        }
    }

    /// Whether this statement is valid for the given dialect.
    pub fn supports(&self, db: &DialectDescriptor) -> bool {
        self.applicability().matches(db)
    }

    /// Statement terminator.
    pub fn end_delimiter(&self) -> &'static str {
        END_DELIMITER
    }

    /// Render SQL text for a dialect.
    ///
    /// # Errors
    ///
    /// `Unsupported` when the statement does not apply to `db`; `Definition`
    /// when a name cannot be escaped.
    pub fn to_sql(&self, db: &DialectDescriptor) -> Result<String> {
        if !self.supports(db) {
            return Err(ChangeError::unsupported(self.kind(), db.name()));
        }

        let dialect = db.dialect();
        match self {
            Statement::DropForeignKey {
                schema,
                table,
                constraint,
            } => {
                validate_identifier(constraint)?;
                Ok(format!(
                    "ALTER TABLE {} {} {}",
                    db.escape_table_name(schema.as_deref(), table)?,
                    dialect.drop_foreign_key_clause(),
                    constraint
                ))
            }
            Statement::DropTable {
                schema,
                table,
                cascade_constraints,
            } => {
                let mut sql = format!("DROP TABLE {}", db.escape_table_name(schema.as_deref(), table)?);
                if *cascade_constraints {
                    if let Some(clause) = dialect.cascade_constraints_clause() {
                        sql.push(' ');
                        sql.push_str(clause);
                    }
                }
                Ok(sql)
            }
            Statement::AddAutoIncrement {
                schema,
                table,
                column,
                data_type,
            } => Ok(dialect.add_auto_increment_sql(
                &db.escape_table_name(schema.as_deref(), table)?,
                &db.escape_column_name(column)?,
                data_type,
            )),
            Statement::DropTrigger { name } => {
                validate_identifier(name)?;
                Ok(format!("DROP TRIGGER {}", name))
            }
            Statement::CreateCascadeTrigger {
                table,
                pk_column,
                rules,
            } => render_cascade_trigger(table, pk_column, rules),
            Statement::Raw { sql, .. } => Ok(sql.clone()),
        }
    }
}

/// Name of the cascade trigger generated for a table.
pub fn cascade_trigger_name(table: &str) -> String {
    format!("TRG_{}_DELETE", table.to_uppercase())
}

fn require_plain(name: &str) -> Result<()> {
    if is_plain_word(name) {
        Ok(())
    } else {
        Err(ChangeError::definition(
            "createTrigger",
            format!("{:?}", name),
            "must be a plain word to appear in a cascade trigger",
        ))
    }
}

fn render_cascade_trigger(table: &str, pk_column: &str, rules: &[CascadeRule]) -> Result<String> {
    require_plain(table)?;
    require_plain(pk_column)?;

    let mut sql = format!(
        "CREATE TRIGGER {} ON {} INSTEAD OF DELETE AS ",
        cascade_trigger_name(table),
        table
    );
    for rule in rules {
        require_plain(&rule.table)?;
        require_plain(&rule.column)?;
        sql.push_str(&format!(
            "UPDATE {t} SET {c} = NULL FROM {t} AS fktable JOIN deleted AS D ON fktable.{c} = D.{pk}\n",
            t = rule.table,
            c = rule.column,
            pk = pk_column
        ));
    }
    sql.push_str(&format!(
        "DELETE {t} FROM {t} INNER JOIN deleted ON {t}.{pk} = deleted.{pk}",
        t = table,
        pk = pk_column
    ));
    Ok(sql)
}
