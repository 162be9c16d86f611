//! MySQL/MariaDB driver.
//!
//! - MySQL 5.7+, 8.0+
//! - MariaDB 10.2+

mod dialect;

pub use dialect::MysqlDialect;
