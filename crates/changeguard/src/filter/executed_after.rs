//! Admit changesets executed after a cutoff.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::changeset::{ChangeSet, ChangeSetId, RanChangeSet};

use super::ChangeSetFilter;

/// Accepts a changeset iff the ledger records it as executed strictly after
/// `cutoff`.
///
/// Entries without an execution timestamp never qualify. An empty ledger
/// accepts nothing.
#[derive(Debug, Clone)]
pub struct ExecutedAfterFilter {
    cutoff: DateTime<Utc>,
    admitted: HashSet<ChangeSetId>,
}

impl ExecutedAfterFilter {
    pub fn new(cutoff: DateTime<Utc>, ledger: &[RanChangeSet]) -> Self {
        let admitted: HashSet<ChangeSetId> = ledger
            .iter()
            .filter(|ran| ran.date_executed.is_some_and(|at| at > cutoff))
            .map(|ran| ran.identity.clone())
            .collect();

        debug!(
            "{} of {} ledger entries executed after {}",
            admitted.len(),
            ledger.len(),
            cutoff
        );

        Self { cutoff, admitted }
    }

    pub fn cutoff(&self) -> DateTime<Utc> {
        self.cutoff
    }
}

impl ChangeSetFilter for ExecutedAfterFilter {
    fn accepts(&self, changeset: &ChangeSet) -> bool {
        self.admitted.contains(&changeset.identity)
    }
}
