//! Dialect catalog for explicit dependency injection.
//!
//! The [`DialectCatalog`] is a registry of database dialects keyed by name,
//! with alias resolution. It is explicitly constructed and handed to whatever
//! builds the [`DialectDescriptor`] for a run.
//!
//! # Design Rationale
//!
//! - **No global state**: Dialects are registered on a value, not in a static
//! - **Explicit registration**: Clear, deterministic initialization order
//! - **Capability-driven**: A new database is added by registering a dialect
//!   that declares its capabilities; no change implementation is edited

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use crate::drivers::{
    DerbyDialect, MssqlDialect, MysqlDialect, PostgresDialect, SqliteDialect, StandardDialect,
};
use crate::error::{ChangeError, Result};

use super::descriptor::DialectDescriptor;
use super::traits::Dialect;

/// Name of the fallback dialect used for unrecognized identities.
pub const STANDARD_DIALECT: &str = "standard";

/// Registry of database dialects.
///
/// # Example
///
/// ```rust,ignore
/// let mut catalog = DialectCatalog::with_builtins();
/// catalog.register_dialect("h2", H2Dialect::new());
/// catalog.register_alias("h2database", "h2");
///
/// let db = catalog.descriptor("h2", Some("PUBLIC"));
/// ```
#[derive(Default)]
pub struct DialectCatalog {
    /// Registered dialects by lowercase name.
    dialects: HashMap<String, Arc<dyn Dialect>>,

    /// Alternative names mapped to registered names.
    aliases: HashMap<String, String>,
}

impl DialectCatalog {
    /// Create a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog with the built-in dialects and their aliases.
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();

        catalog.register_dialect("mssql", MssqlDialect::new());
        catalog.register_dialect("postgres", PostgresDialect::new());
        catalog.register_dialect("mysql", MysqlDialect::new());
        catalog.register_dialect("sqlite", SqliteDialect::new());
        catalog.register_dialect("derby", DerbyDialect::new());
        catalog.register_dialect(STANDARD_DIALECT, StandardDialect::new());

        for (alias, name) in [
            ("sqlserver", "mssql"),
            ("sql_server", "mssql"),
            ("postgresql", "postgres"),
            ("pg", "postgres"),
            ("mariadb", "mysql"),
            ("sqlite3", "sqlite"),
            ("apache derby", "derby"),
        ] {
            catalog.register_alias(alias, name);
        }

        catalog
    }

    /// Register a dialect by name.
    pub fn register_dialect(&mut self, name: impl Into<String>, dialect: impl Dialect + 'static) {
        self.register_dialect_arc(name, Arc::new(dialect));
    }

    /// Register a dialect as an Arc (for sharing).
    pub fn register_dialect_arc(&mut self, name: impl Into<String>, dialect: Arc<dyn Dialect>) {
        self.dialects.insert(normalize(&name.into()), dialect);
    }

    /// Register an alternative name for a registered dialect.
    pub fn register_alias(&mut self, alias: impl Into<String>, name: impl Into<String>) {
        self.aliases
            .insert(normalize(&alias.into()), normalize(&name.into()));
    }

    /// Resolve an alias to the registered dialect name.
    pub fn canonical_name(&self, name: &str) -> Option<&str> {
        let key = normalize(name);
        let key = self.aliases.get(&key).unwrap_or(&key);
        self.dialects.get_key_value(key).map(|(k, _)| k.as_str())
    }

    /// Get a dialect by name or alias.
    pub fn get_dialect(&self, name: &str) -> Option<Arc<dyn Dialect>> {
        self.canonical_name(name)
            .and_then(|key| self.dialects.get(key))
            .cloned()
    }

    /// Get a dialect by name, returning an error if not found.
    pub fn require_dialect(&self, name: &str) -> Result<Arc<dyn Dialect>> {
        self.get_dialect(name)
            .ok_or_else(|| ChangeError::Config(format!("Unknown database dialect: {}", name)))
    }

    /// Get a dialect by name, falling back to standard SQL when unknown.
    pub fn resolve(&self, name: &str) -> Arc<dyn Dialect> {
        if let Some(dialect) = self.get_dialect(name) {
            return dialect;
        }

        warn!(
            "Unknown database dialect '{}', using standard SQL behavior",
            name
        );
        self.dialects
            .get(STANDARD_DIALECT)
            .cloned()
            .unwrap_or_else(|| Arc::new(StandardDialect::new()))
    }

    /// Aliases registered for a dialect, sorted. `name` may itself be an
    /// alias.
    pub fn aliases_of(&self, name: &str) -> Vec<&str> {
        let Some(canonical) = self.canonical_name(name) else {
            return Vec::new();
        };
        let mut aliases: Vec<&str> = self
            .aliases
            .iter()
            .filter(|(_, target)| target.as_str() == canonical)
            .map(|(alias, _)| alias.as_str())
            .collect();
        aliases.sort_unstable();
        aliases
    }

    /// Build a descriptor for a dialect name and optional default schema.
    ///
    /// The descriptor answers to every alias of the resolved dialect, so
    /// name checks against it need no catalog.
    pub fn descriptor(&self, name: &str, default_schema: Option<&str>) -> DialectDescriptor {
        let dialect = self.resolve(name);
        let canonical = self
            .canonical_name(name)
            .unwrap_or(STANDARD_DIALECT)
            .to_string();
        let mut aliases: Vec<String> = self
            .aliases_of(&canonical)
            .into_iter()
            .map(str::to_string)
            .collect();
        if !canonical.eq_ignore_ascii_case(dialect.name()) {
            aliases.push(canonical);
        }

        let descriptor = DialectDescriptor::new(dialect).with_aliases(aliases);
        match default_schema {
            Some(schema) => descriptor.with_default_schema(schema),
            None => descriptor,
        }
    }

    /// Check if a dialect (or alias) is registered.
    pub fn has_dialect(&self, name: &str) -> bool {
        self.canonical_name(name).is_some()
    }

    /// Get all registered dialect names, sorted.
    pub fn dialect_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.dialects.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

impl std::fmt::Debug for DialectCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialectCatalog")
            .field("dialects", &self.dialect_names())
            .field("aliases", &self.aliases.keys().collect::<Vec<_>>())
            .finish()
    }
}
