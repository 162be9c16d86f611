//! Admission by target dialect.

use crate::changeset::ChangeSet;
use crate::core::descriptor::DialectDescriptor;

use super::ChangeSetFilter;

/// Accepts changesets that name no dbms or name the target dialect under any
/// of its names.
#[derive(Debug, Clone)]
pub struct DbmsFilter {
    names: Vec<String>,
}

impl DbmsFilter {
    /// Filter matching a single dialect name.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            names: vec![target.into().trim().to_lowercase()],
        }
    }

    /// Filter matching the descriptor's dialect and every alias it carries.
    pub fn for_descriptor(db: &DialectDescriptor) -> Self {
        let mut names = vec![db.name().to_lowercase()];
        names.extend(db.aliases().iter().cloned());
        Self { names }
    }
}

impl ChangeSetFilter for DbmsFilter {
    fn accepts(&self, changeset: &ChangeSet) -> bool {
        changeset.dbms.is_empty()
            || changeset.dbms.iter().any(|d| {
                let d = d.trim();
                self.names.iter().any(|n| n.eq_ignore_ascii_case(d))
            })
    }
}
