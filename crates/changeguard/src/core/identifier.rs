//! Identifier validation and quoting shared by every dialect.
//!
//! Table, column and schema names cannot be bound as statement parameters, so
//! generated DDL splices them into SQL text. Every name is validated before
//! quoting:
//! 1. Reject empty names, null bytes and names over the length limit
//! 2. Wrap in the dialect's quote characters
//! 3. Double any embedded closing quote character

use crate::error::{ChangeError, Result};

/// Maximum identifier length (conservative limit across databases).
/// - PostgreSQL: 63 bytes
/// - SQL Server: 128 characters
/// - MySQL: 64 characters
const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Validate an identifier for security issues.
///
/// # Errors
///
/// Returns `ChangeError::Definition` naming the offending identifier.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ChangeError::definition(
            "identifier",
            "name",
            "cannot be empty",
        ));
    }

    if name.contains('\0') {
        return Err(ChangeError::definition(
            "identifier",
            format!("{:?}", name),
            "contains a null byte",
        ));
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(ChangeError::definition(
            "identifier",
            format!("{:?}", name),
            format!(
                "exceeds maximum length of {} bytes (got {} bytes)",
                MAX_IDENTIFIER_LENGTH,
                name.len()
            ),
        ));
    }

    Ok(())
}

/// Quote with double quotes (PostgreSQL, Derby, standard SQL).
pub fn quote_double(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote with backticks (MySQL/MariaDB).
pub fn quote_backtick(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Quote with square brackets (SQL Server).
pub fn quote_brackets(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

/// Check whether a name is a plain word (`[A-Za-z0-9_]+`).
///
/// Cascade trigger bodies are matched textually, so names written into them
/// must stay bare words.
pub fn is_plain_word(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
