//! Changeset admission filters.
//!
//! A filter is a pure predicate over a [`ChangeSet`]. Filters are built once
//! from their inputs (ledger, target dialect, requested contexts) and are
//! cheap to query repeatedly.

mod context;
mod dbms;
mod executed_after;

pub use context::ContextFilter;
pub use dbms::DbmsFilter;
pub use executed_after::ExecutedAfterFilter;

use crate::changeset::ChangeSet;

/// Decides whether a changeset is admitted.
pub trait ChangeSetFilter: Send + Sync {
    fn accepts(&self, changeset: &ChangeSet) -> bool;
}

/// True when every filter accepts the changeset. An empty filter list
/// accepts everything.
pub fn accepts_all(filters: &[&dyn ChangeSetFilter], changeset: &ChangeSet) -> bool {
    filters.iter().all(|f| f.accepts(changeset))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_all_combines() {
        let changeset = ChangeSet::new("1", "bob", "changelog.xml").with_dbms("mssql");
        let mssql = DbmsFilter::new("mssql");
        let pg = DbmsFilter::new("postgres");
        let contexts = ContextFilter::new(Vec::<String>::new());

        assert!(accepts_all(&[], &changeset));
        assert!(accepts_all(&[&mssql, &contexts], &changeset));
        assert!(!accepts_all(&[&mssql, &pg], &changeset));
    }
}
