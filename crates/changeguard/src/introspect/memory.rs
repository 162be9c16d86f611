//! In-memory introspector.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::core::schema::{ForeignKey, Table, TriggerHeader};
use crate::core::traits::Introspector;
use crate::error::{ChangeError, Result};

#[derive(Debug, Clone)]
struct StoredTrigger {
    header: TriggerHeader,
    lines: Vec<String>,
}

/// Schema held in memory, answering the same queries a live database would.
///
/// Used for offline planning against a known schema and throughout the test
/// suite.
#[derive(Debug, Default)]
pub struct MemoryIntrospector {
    tables: Vec<Table>,
    foreign_keys: Vec<ForeignKey>,
    triggers: Vec<StoredTrigger>,
    failing_text: Vec<String>,
    table_queries: AtomicUsize,
    text_queries: AtomicUsize,
}

impl MemoryIntrospector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    pub fn with_foreign_key(mut self, fk: ForeignKey) -> Self {
        self.foreign_keys.push(fk);
        self
    }

    /// Add a trigger whose text is returned one line per row, like
    /// `sp_helptext`.
    pub fn with_trigger(
        self,
        name: impl Into<String>,
        table: impl Into<String>,
        body: &str,
    ) -> Self {
        let lines = body.split_inclusive('\n').map(String::from).collect();
        self.with_trigger_lines(name, table, lines)
    }

    /// Add a trigger with explicit text rows (empty for "no text").
    pub fn with_trigger_lines(
        mut self,
        name: impl Into<String>,
        table: impl Into<String>,
        lines: Vec<String>,
    ) -> Self {
        self.triggers.push(StoredTrigger {
            header: TriggerHeader {
                name: name.into(),
                table: table.into(),
            },
            lines,
        });
        self
    }

    /// Make text queries for a trigger fail like a lost connection.
    pub fn with_failing_trigger_text(mut self, name: impl Into<String>) -> Self {
        self.failing_text.push(name.into());
        self
    }

    /// Number of table listing queries served (one per snapshot capture).
    pub fn capture_count(&self) -> usize {
        self.table_queries.load(Ordering::SeqCst)
    }

    /// Number of trigger text queries served.
    pub fn trigger_text_count(&self) -> usize {
        self.text_queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Introspector for MemoryIntrospector {
    async fn list_tables(&self, schema: Option<&str>) -> Result<Vec<Table>> {
        self.table_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .tables
            .iter()
            .filter(|t| schema.map_or(true, |s| t.schema.eq_ignore_ascii_case(s)))
            .cloned()
            .collect())
    }

    async fn foreign_keys(&self, table: &Table) -> Result<Vec<ForeignKey>> {
        Ok(self
            .foreign_keys
            .iter()
            .filter(|fk| fk.owning_table.eq_ignore_ascii_case(&table.name))
            .cloned()
            .collect())
    }

    async fn list_triggers(&self) -> Result<Vec<TriggerHeader>> {
        let mut headers: Vec<TriggerHeader> =
            self.triggers.iter().map(|t| t.header.clone()).collect();
        headers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(headers)
    }

    async fn trigger_text_lines(&self, trigger_name: &str) -> Result<Vec<String>> {
        self.text_queries.fetch_add(1, Ordering::SeqCst);
        if self
            .failing_text
            .iter()
            .any(|n| n.eq_ignore_ascii_case(trigger_name))
        {
            return Err(ChangeError::introspection(format!(
                "connection lost reading text of {}",
                trigger_name
            )));
        }

        Ok(self
            .triggers
            .iter()
            .find(|t| t.header.name.eq_ignore_ascii_case(trigger_name))
            .map(|t| t.lines.clone())
            .unwrap_or_default())
    }
}
