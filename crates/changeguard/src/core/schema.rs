//! Schema snapshot types: tables, columns, keys and triggers.
//!
//! A [`Snapshot`] is captured once per generation (or reused across several
//! changes in the same run) and never mutated afterwards. All name lookups
//! are case-insensitive because identifier case folding differs by engine.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::Result;

/// Table metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Schema name.
    pub schema: String,

    /// Table name.
    pub name: String,

    /// Column definitions in ordinal order.
    pub columns: Vec<Column>,

    /// Primary key, if the table has one.
    #[serde(default)]
    pub primary_key: Option<PrimaryKey>,
}

impl Table {
    /// Create a table with no columns and no primary key.
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            columns: Vec::new(),
            primary_key: None,
        }
    }

    /// Add a column (builder style).
    pub fn with_column(mut self, name: impl Into<String>, data_type: impl Into<String>) -> Self {
        self.columns.push(Column {
            name: name.into(),
            data_type: data_type.into(),
            is_nullable: true,
        });
        self
    }

    /// Set the primary key (builder style).
    pub fn with_primary_key(mut self, name: impl Into<String>, columns: &[&str]) -> Self {
        self.primary_key = Some(PrimaryKey::new(name, columns));
        self
    }

    /// Get the fully qualified table name.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    /// Find a column by name, ignoring case.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// The single primary key column, if the key has exactly one column.
    pub fn single_pk_column(&self) -> Option<&str> {
        match &self.primary_key {
            Some(pk) if pk.columns.len() == 1 => Some(pk.columns[0].as_str()),
            _ => None,
        }
    }
}

/// Column metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,

    /// Data type (e.g., "int", "varchar").
    pub data_type: String,

    /// Whether the column allows NULL.
    pub is_nullable: bool,
}

/// Primary key constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKey {
    /// Constraint name (may be empty when the engine does not name keys).
    pub name: String,

    /// Key columns in key order.
    pub columns: Vec<String>,
}

impl PrimaryKey {
    pub fn new(name: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            name: name.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Foreign key metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Constraint name.
    pub name: String,

    /// Table that owns the constraint (the referencing side).
    pub owning_table: String,

    /// Referencing column names.
    pub owning_columns: Vec<String>,

    /// Referenced table name.
    pub referenced_table: String,

    /// Referenced column names.
    pub referenced_columns: Vec<String>,
}

impl ForeignKey {
    /// Create a single-column foreign key.
    pub fn new(
        name: impl Into<String>,
        owning_table: impl Into<String>,
        owning_column: impl Into<String>,
        referenced_table: impl Into<String>,
        referenced_column: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            owning_table: owning_table.into(),
            owning_columns: vec![owning_column.into()],
            referenced_table: referenced_table.into(),
            referenced_columns: vec![referenced_column.into()],
        }
    }

    /// Whether this key links exactly `owning_table.owning_column` to
    /// `referenced_table.referenced_column`, ignoring case.
    pub fn links(
        &self,
        owning_table: &str,
        owning_column: &str,
        referenced_table: &str,
        referenced_column: &str,
    ) -> bool {
        self.owning_table.eq_ignore_ascii_case(owning_table)
            && self.referenced_table.eq_ignore_ascii_case(referenced_table)
            && single_eq(&self.owning_columns, owning_column)
            && single_eq(&self.referenced_columns, referenced_column)
    }
}

fn single_eq(columns: &[String], column: &str) -> bool {
    columns.len() == 1 && columns[0].eq_ignore_ascii_case(column)
}

/// A trigger as listed by the fixed "trigger name, owning table" query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerHeader {
    /// Trigger name.
    pub name: String,

    /// Table the trigger is defined on.
    pub table: String,
}

/// A trigger together with its source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerInfo {
    /// Trigger name.
    pub name: String,

    /// Table the trigger is defined on.
    pub table: String,

    /// Full trigger source.
    pub body: String,
}

/// A cascade rule parsed from a trigger body: "null `column` of `table` when
/// the referenced row is deleted".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CascadeRule {
    /// Referencing table.
    pub table: String,

    /// Referencing column.
    pub column: String,
}

impl CascadeRule {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Case-insensitive rule equality.
    pub fn same_as(&self, other: &CascadeRule) -> bool {
        self.table.eq_ignore_ascii_case(&other.table)
            && self.column.eq_ignore_ascii_case(&other.column)
    }
}

/// Point-in-time model of live schema structure.
///
/// Tables and foreign keys are captured eagerly. Trigger text is fetched on
/// first demand and cached for the snapshot's lifetime, once per table
/// prefix. A snapshot goes stale
/// as soon as a statement touching a deleted object executes; recapturing is
/// the caller's responsibility.
#[derive(Debug, Default)]
pub struct Snapshot {
    tables: Vec<Table>,
    foreign_keys: Vec<ForeignKey>,
    triggers: Mutex<HashMap<String, Arc<Vec<TriggerInfo>>>>,
}

impl Snapshot {
    /// Create a snapshot from captured tables and foreign keys.
    pub fn new(tables: Vec<Table>, foreign_keys: Vec<ForeignKey>) -> Self {
        Self {
            tables,
            foreign_keys,
            triggers: Mutex::new(HashMap::new()),
        }
    }

    /// All captured tables.
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Find a table by name, ignoring case.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Primary key of a table, if both exist.
    pub fn primary_key_for_table(&self, name: &str) -> Option<&PrimaryKey> {
        self.table(name).and_then(|t| t.primary_key.as_ref())
    }

    /// All captured foreign keys.
    pub fn foreign_keys(&self) -> &[ForeignKey] {
        &self.foreign_keys
    }

    /// Find a foreign key by constraint name and owning table, ignoring case.
    pub fn foreign_key(&self, name: &str, owning_table: &str) -> Option<&ForeignKey> {
        self.foreign_keys.iter().find(|fk| {
            fk.name.eq_ignore_ascii_case(name) && fk.owning_table.eq_ignore_ascii_case(owning_table)
        })
    }

    /// Cached trigger list for a table prefix, fetching it with `fetch` on
    /// first use of that prefix.
    ///
    /// The prefix is compared ignoring case. A failed fetch caches nothing so
    /// the next call retries.
    pub async fn cached_triggers<F, Fut>(
        &self,
        table_prefix: &str,
        fetch: F,
    ) -> Result<Arc<Vec<TriggerInfo>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<TriggerInfo>>>,
    {
        let key = table_prefix.to_lowercase();
        let mut cache = self.triggers.lock().await;
        if let Some(triggers) = cache.get(&key) {
            return Ok(Arc::clone(triggers));
        }

        let triggers = Arc::new(fetch().await?);
        cache.insert(key, Arc::clone(&triggers));
        Ok(triggers)
    }
}

/// A named reference to a schema object.
///
/// Describes both the objects a change affects and the objects a pending
/// delete will remove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseObjectRef {
    Table {
        schema: Option<String>,
        name: String,
    },
    ForeignKey {
        name: String,
        owning_table: String,
    },
    Column {
        table: String,
        name: String,
    },
    Trigger {
        name: String,
        owning_table: String,
    },
}

impl DatabaseObjectRef {
    pub fn table(schema: Option<&str>, name: impl Into<String>) -> Self {
        DatabaseObjectRef::Table {
            schema: schema.map(str::to_string),
            name: name.into(),
        }
    }

    pub fn foreign_key(name: impl Into<String>, owning_table: impl Into<String>) -> Self {
        DatabaseObjectRef::ForeignKey {
            name: name.into(),
            owning_table: owning_table.into(),
        }
    }

    pub fn column(table: impl Into<String>, name: impl Into<String>) -> Self {
        DatabaseObjectRef::Column {
            table: table.into(),
            name: name.into(),
        }
    }

    pub fn trigger(name: impl Into<String>, owning_table: impl Into<String>) -> Self {
        DatabaseObjectRef::Trigger {
            name: name.into(),
            owning_table: owning_table.into(),
        }
    }
}

/// Objects that will be removed in the current transaction.
///
/// Membership is transitive: dropping a table also removes its columns, the
/// foreign keys it owns or is referenced by, and its triggers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletedObjects {
    objects: Vec<DatabaseObjectRef>,
}

impl DeletedObjects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deleted set holding a single object.
    pub fn single(object: DatabaseObjectRef) -> Self {
        Self {
            objects: vec![object],
        }
    }

    pub fn insert(&mut self, object: DatabaseObjectRef) {
        if !self.objects.contains(&object) {
            self.objects.push(object);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Objects in either set, `self` first.
    pub fn union(&self, other: &DeletedObjects) -> DeletedObjects {
        let mut merged = self.clone();
        merged.extend(other.iter().cloned());
        merged
    }

    pub fn iter(&self) -> impl Iterator<Item = &DatabaseObjectRef> {
        self.objects.iter()
    }

    /// Whether a table is being dropped.
    pub fn contains_table(&self, name: &str) -> bool {
        self.objects.iter().any(|o| match o {
            DatabaseObjectRef::Table { name: n, .. } => n.eq_ignore_ascii_case(name),
            _ => false,
        })
    }

    /// Whether a column is being dropped, directly or with its table.
    pub fn contains_column(&self, table: &str, column: &str) -> bool {
        self.contains_table(table)
            || self.objects.iter().any(|o| match o {
                DatabaseObjectRef::Column { table: t, name } => {
                    t.eq_ignore_ascii_case(table) && name.eq_ignore_ascii_case(column)
                }
                _ => false,
            })
    }

    /// Whether a foreign key is being dropped, directly or through any table
    /// or column it connects.
    pub fn contains_foreign_key(&self, fk: &ForeignKey) -> bool {
        let named = self.objects.iter().any(|o| match o {
            DatabaseObjectRef::ForeignKey { name, owning_table } => {
                name.eq_ignore_ascii_case(&fk.name)
                    && owning_table.eq_ignore_ascii_case(&fk.owning_table)
            }
            _ => false,
        });

        named
            || fk
                .owning_columns
                .iter()
                .any(|c| self.contains_column(&fk.owning_table, c))
            || fk
                .referenced_columns
                .iter()
                .any(|c| self.contains_column(&fk.referenced_table, c))
            || self.contains_table(&fk.owning_table)
            || self.contains_table(&fk.referenced_table)
    }

    /// Whether a trigger is being dropped, directly or with its table.
    pub fn contains_trigger(&self, name: &str, owning_table: &str) -> bool {
        self.contains_table(owning_table)
            || self.objects.iter().any(|o| match o {
                DatabaseObjectRef::Trigger {
                    name: n,
                    owning_table: t,
                } => n.eq_ignore_ascii_case(name) && t.eq_ignore_ascii_case(owning_table),
                _ => false,
            })
    }
}

impl FromIterator<DatabaseObjectRef> for DeletedObjects {
    fn from_iter<I: IntoIterator<Item = DatabaseObjectRef>>(iter: I) -> Self {
        let mut deleted = DeletedObjects::new();
        deleted.extend(iter);
        deleted
    }
}

impl Extend<DatabaseObjectRef> for DeletedObjects {
    fn extend<I: IntoIterator<Item = DatabaseObjectRef>>(&mut self, iter: I) {
        for object in iter {
            self.insert(object);
        }
    }
}
