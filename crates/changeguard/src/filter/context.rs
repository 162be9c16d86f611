use crate::changeset::ChangeSet;

use super::ChangeSetFilter;

/// Accepts changesets whose contexts intersect the requested run contexts.
///
/// No requested contexts, or a changeset that declares none, always passes.
#[derive(Debug, Clone, Default)]
pub struct ContextFilter {
    contexts: Vec<String>,
}

impl ContextFilter {
    pub fn new<I, S>(contexts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            contexts: contexts
                .into_iter()
                .map(|c| c.into().trim().to_lowercase())
                .filter(|c| !c.is_empty())
                .collect(),
        }
    }
}

impl ChangeSetFilter for ContextFilter {
    fn accepts(&self, changeset: &ChangeSet) -> bool {
        if self.contexts.is_empty() || changeset.contexts.is_empty() {
            return true;
        }
        changeset.contexts.iter().any(|declared| {
            let declared = declared.trim();
            self.contexts
                .iter()
                .any(|c| c.eq_ignore_ascii_case(declared))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_filter() {
        let tagged = ChangeSet::new("1", "bob", "changelog.xml").with_context("Test");
        let untagged = ChangeSet::new("2", "bob", "changelog.xml");

        assert!(ContextFilter::new(Vec::<String>::new()).accepts(&tagged));
        assert!(ContextFilter::new(["test", "prod"]).accepts(&tagged));
        assert!(!ContextFilter::new(["prod"]).accepts(&tagged));
        assert!(ContextFilter::new(["prod"]).accepts(&untagged));
        assert!(ContextFilter::new([" ", ""]).accepts(&tagged));
    }
}
