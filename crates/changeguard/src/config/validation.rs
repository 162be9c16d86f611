//! Configuration validation.

use super::Config;
use crate::error::{ChangeError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    // Target validation
    if config.target.r#type.trim().is_empty() {
        return Err(ChangeError::Config("target.type is required".into()));
    }
    if let Some(schema) = &config.target.default_schema {
        if schema.trim().is_empty() {
            return Err(ChangeError::Config(
                "target.default_schema cannot be blank when set".into(),
            ));
        }
    }

    // Trigger convention validation
    let prefix = &config.triggers.table_prefix;
    if prefix.is_empty() {
        return Err(ChangeError::Config("triggers.table_prefix is required".into()));
    }
    if !prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ChangeError::Config(format!(
            "triggers.table_prefix must contain only letters, digits and '_', got '{}'",
            prefix
        )));
    }

    if config.run.contexts.iter().any(|c| c.trim().is_empty()) {
        return Err(ChangeError::Config("run.contexts cannot contain blank entries".into()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RunConfig, TargetConfig, TriggersConfig};

    fn valid_config() -> Config {
        Config {
            target: TargetConfig {
                r#type: "mssql".to_string(),
                default_schema: Some("dbo".to_string()),
            },
            triggers: TriggersConfig::default(),
            run: RunConfig::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_missing_target_type() {
        let mut config = valid_config();
        config.target.r#type = " ".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_blank_default_schema() {
        let mut config = valid_config();
        config.target.default_schema = Some(String::new());
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_prefix_must_be_word_characters() {
        let mut config = valid_config();
        config.triggers.table_prefix = "cxml-".to_string();
        assert!(validate(&config).is_err());

        config.triggers.table_prefix = String::new();
        assert!(validate(&config).is_err());

        config.triggers.table_prefix = "app_".to_string();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_blank_context() {
        let mut config = valid_config();
        config.run.contexts = vec!["prod".to_string(), "".to_string()];
        assert!(validate(&config).is_err());
    }
}
