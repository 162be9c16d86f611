//! Apache Derby driver.

mod dialect;

pub use dialect::DerbyDialect;
