//! Naming convention for cascade-managed tables and rule extraction.

use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::core::identifier::is_plain_word;
use crate::core::schema::CascadeRule;
use crate::core::statement::cascade_trigger_name;
use crate::error::{ChangeError, Result};

/// Table prefix used when none is configured.
pub const DEFAULT_TABLE_PREFIX: &str = "cxml_";

/// Which tables carry hand-maintained cascade triggers, and how their
/// trigger bodies are read.
#[derive(Debug, Clone)]
pub struct TriggerConvention {
    table_prefix: String,
    rule_pattern: Regex,
}

impl TriggerConvention {
    /// Build a convention for tables whose names start with `table_prefix`.
    ///
    /// # Errors
    ///
    /// Returns `ChangeError::Config` if the prefix is not a plain word.
    pub fn new(table_prefix: impl Into<String>) -> Result<Self> {
        let table_prefix = table_prefix.into();
        if !is_plain_word(&table_prefix) {
            return Err(ChangeError::Config(format!(
                "trigger table prefix '{}' must be made of word characters",
                table_prefix
            )));
        }

        // Only the single-statement "UPDATE <managed table> SET <column> = NULL"
        // idiom is recognized. Anything else in the body is ignored.
        let rule_pattern = RegexBuilder::new(&format!(
            r"UPDATE ({}\w+) SET (\w+) = NULL",
            regex::escape(&table_prefix)
        ))
        .case_insensitive(true)
        .build()
        .map_err(|e| ChangeError::Config(format!("Invalid cascade rule pattern: {}", e)))?;

        Ok(Self {
            table_prefix,
            rule_pattern,
        })
    }

    pub fn table_prefix(&self) -> &str {
        &self.table_prefix
    }

    /// Whether a table is cascade-managed.
    pub fn is_managed_table(&self, table: &str) -> bool {
        table
            .to_lowercase()
            .starts_with(&self.table_prefix.to_lowercase())
    }

    /// Name of the regenerated trigger for a table.
    pub fn trigger_name_for(&self, table: &str) -> String {
        cascade_trigger_name(table)
    }

    /// Extract the cascade rules a trigger body declares.
    ///
    /// Duplicates (ignoring case) collapse to their first occurrence; the
    /// result keeps first-occurrence order.
    pub fn extract_cascade_rules(&self, body: &str) -> Vec<CascadeRule> {
        let mut rules: Vec<CascadeRule> = Vec::new();
        for caps in self.rule_pattern.captures_iter(body) {
            let (Some(table), Some(column)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            let rule = CascadeRule::new(table.as_str(), column.as_str());
            if !rules.iter().any(|r| r.same_as(&rule)) {
                rules.push(rule);
            }
        }

        debug!("Extracted {} cascade rules", rules.len());
        rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_convention() -> TriggerConvention {
        TriggerConvention::new(DEFAULT_TABLE_PREFIX).unwrap()
    }

    #[test]
    fn test_managed_table_prefix_ignores_case() {
        let convention = default_convention();
        assert!(convention.is_managed_table("cxml_folder"));
        assert!(convention.is_managed_table("CXML_Folder"));
        assert!(!convention.is_managed_table("users"));
    }

    #[test]
    fn test_extract_rules() {
        let convention = default_convention();
        let body = "CREATE TRIGGER TRG_CXML_FOLDER_DELETE ON cxml_folder INSTEAD OF DELETE AS \
            UPDATE cxml_page SET folderId = NULL FROM cxml_page AS fktable JOIN deleted AS D ON fktable.folderId = D.id\n\
            update CXML_File set parentFolderId = null FROM cxml_file AS fktable\n\
            DELETE cxml_folder FROM cxml_folder INNER JOIN deleted ON cxml_folder.id = deleted.id";

        let rules = convention.extract_cascade_rules(body);
        assert_eq!(
            rules,
            vec![
                CascadeRule::new("cxml_page", "folderId"),
                CascadeRule::new("CXML_File", "parentFolderId"),
            ]
        );
    }

    #[test]
    fn test_extract_ignores_other_shapes() {
        let convention = default_convention();
        let body = "UPDATE users SET owner = NULL\n\
            UPDATE cxml_page SET folderId = 0\n\
            UPDATE cxml_page SET  folderId = NULL\n\
            DELETE FROM cxml_page WHERE folderId IN (SELECT id FROM deleted)";
        assert!(convention.extract_cascade_rules(body).is_empty());
    }

    #[test]
    fn test_extract_collapses_duplicates() {
        let convention = default_convention();
        let body = "UPDATE cxml_page SET folderId = NULL\nUPDATE CXML_PAGE SET FOLDERID = NULL";
        assert_eq!(
            convention.extract_cascade_rules(body),
            vec![CascadeRule::new("cxml_page", "folderId")]
        );
    }

    #[test]
    fn test_custom_prefix() {
        let convention = TriggerConvention::new("app_").unwrap();
        let body = "UPDATE app_order SET customer_id = NULL\nUPDATE cxml_page SET folderId = NULL";
        assert_eq!(
            convention.extract_cascade_rules(body),
            vec![CascadeRule::new("app_order", "customer_id")]
        );
        assert!(TriggerConvention::new("bad-prefix").is_err());
        assert!(TriggerConvention::new("").is_err());
    }

    #[test]
    fn test_trigger_name_for() {
        let convention = default_convention();
        assert_eq!(convention.trigger_name_for("cxml_page"), "TRG_CXML_PAGE_DELETE");
    }
}
