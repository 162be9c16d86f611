//! Error types for change generation, trigger repair and configuration.

use thiserror::Error;

/// Main error type for change generation.
#[derive(Error, Debug)]
pub enum ChangeError {
    /// A change is missing a required field (detected by `validate()`).
    #[error("Invalid {change} definition: {field} {message}")]
    Definition {
        change: String,
        field: String,
        message: String,
    },

    /// The target dialect cannot express the requested operation.
    #[error("{change} is not supported on {dialect}")]
    Unsupported { change: String, dialect: String },

    /// Required schema facts (trigger text, primary key, foreign keys) could not be read.
    #[error("Introspection failed: {0}")]
    Introspection(String),

    /// Driver error raised while introspecting a live SQL Server database.
    #[cfg(feature = "mssql")]
    #[error("Source database error: {0}")]
    Source(#[from] tiberius::error::Error),

    /// A custom precondition reported failure.
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// A custom precondition could not be evaluated.
    #[error("Precondition error: {0}")]
    PreconditionError(String),

    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ChangeError {
    /// Create a Definition error for a missing or blank field.
    pub fn definition(
        change: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ChangeError::Definition {
            change: change.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an Unsupported error for a change on a dialect.
    pub fn unsupported(change: impl Into<String>, dialect: impl Into<String>) -> Self {
        ChangeError::Unsupported {
            change: change.into(),
            dialect: dialect.into(),
        }
    }

    /// Create an Introspection error.
    pub fn introspection(message: impl Into<String>) -> Self {
        ChangeError::Introspection(message.into())
    }

    /// Whether this error came from reading the live schema.
    ///
    /// Driver errors count as introspection failures: both abort the current
    /// repair computation without emitting anything.
    pub fn is_introspection(&self) -> bool {
        match self {
            ChangeError::Introspection(_) => true,
            #[cfg(feature = "mssql")]
            ChangeError::Source(_) => true,
            _ => false,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for change generation.
pub type Result<T> = std::result::Result<T, ChangeError>;
