//! Standard SQL fallback driver.

mod dialect;

pub use dialect::StandardDialect;
