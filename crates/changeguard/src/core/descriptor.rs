//! Per-connection dialect descriptor.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;

use super::identifier::validate_identifier;
use super::traits::{Capability, Dialect, LogicalType};

/// Dialect plus connection-level settings, shared read-only by every change
/// generated in a run.
#[derive(Clone)]
pub struct DialectDescriptor {
    dialect: Arc<dyn Dialect>,
    default_schema: Option<String>,
    aliases: Vec<String>,
}

impl DialectDescriptor {
    pub fn new(dialect: Arc<dyn Dialect>) -> Self {
        Self {
            dialect,
            default_schema: None,
            aliases: Vec::new(),
        }
    }

    /// Alternative names the dialect also answers to (builder style).
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases
            .into_iter()
            .map(|a| a.into().trim().to_lowercase())
            .filter(|a| !a.is_empty())
            .collect();
        self
    }

    /// Set the schema used when a change names none (builder style).
    pub fn with_default_schema(mut self, schema: impl Into<String>) -> Self {
        let schema = schema.into();
        self.default_schema = if schema.trim().is_empty() {
            None
        } else {
            Some(schema)
        };
        self
    }

    /// Dialect identifier (e.g., "mssql").
    pub fn name(&self) -> &str {
        self.dialect.name()
    }

    /// Alternative names, lowercased.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Whether `name` is the dialect identifier or one of its aliases,
    /// ignoring case.
    pub fn is_named(&self, name: &str) -> bool {
        let name = name.trim();
        self.dialect.name().eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    pub fn default_schema(&self) -> Option<&str> {
        self.default_schema.as_deref()
    }

    pub fn supports(&self, capability: Capability) -> bool {
        self.dialect.supports(capability)
    }

    pub fn type_name(&self, logical: LogicalType) -> &str {
        self.dialect.type_name(logical)
    }

    /// Escape a possibly schema-qualified table name.
    ///
    /// Falls back to the default schema when `schema` is `None` or blank.
    pub fn escape_table_name(&self, schema: Option<&str>, table: &str) -> Result<String> {
        validate_identifier(table)?;
        let schema = schema
            .filter(|s| !s.trim().is_empty())
            .or(self.default_schema.as_deref());

        match schema {
            Some(schema) => {
                validate_identifier(schema)?;
                Ok(format!(
                    "{}.{}",
                    self.dialect.quote_ident(schema),
                    self.dialect.quote_ident(table)
                ))
            }
            None => Ok(self.dialect.quote_ident(table)),
        }
    }

    /// Escape a column name.
    pub fn escape_column_name(&self, column: &str) -> Result<String> {
        validate_identifier(column)?;
        Ok(self.dialect.quote_ident(column))
    }
}

impl fmt::Debug for DialectDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialectDescriptor")
            .field("dialect", &self.dialect.name())
            .field("default_schema", &self.default_schema)
            .field("aliases", &self.aliases)
            .finish()
    }
}
