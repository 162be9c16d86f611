//! Trigger consistency engine.
//!
//! Some schemas implement cascading deletes with hand-authored
//! `INSTEAD OF DELETE` triggers on tables named by a convention (e.g.
//! `cxml_*`). Each such trigger nulls referencing columns before deleting the
//! row. Dropping a table, column or foreign key silently breaks these
//! triggers, so before such a drop the engine:
//!
//! 1. Lists the triggers on managed tables and reads their text
//! 2. Extracts the `UPDATE <table> SET <column> = NULL` cascade rules
//! 3. Drops rules whose table, column or backing foreign key is gone
//! 4. Emits `DROP TRIGGER` + `CREATE TRIGGER` for every trigger that lost rules
//!
//! Rule extraction is textual, not a SQL parser. Statements of any other
//! shape inside a trigger body are ignored.

mod convention;
mod engine;

pub use convention::{TriggerConvention, DEFAULT_TABLE_PREFIX};
pub use engine::{build_repair, TriggerEngine, TriggerRepair};
