//! PostgreSQL driver.

mod dialect;

pub use dialect::PostgresDialect;
