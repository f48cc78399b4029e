//! Diff calculation between snapshots.
//!
//! Both snapshots are treated as sets of posts under exact equality of
//! `(title, url)`. A post whose title or url changed at all shows up as one
//! removal plus one addition; there is no fuzzy matching.

use std::collections::BTreeSet;

use crate::models::Post;

/// Posts added and removed between two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
    /// In the new snapshot but not the old one
    pub added: BTreeSet<Post>,
    /// In the old snapshot but not the new one
    pub removed: BTreeSet<Post>,
}

impl Diff {
    /// Check if there are any changes.
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }
}

/// Compute `(added, removed)` going from `old` to `new`.
pub fn calculate_diff(new: &[Post], old: &[Post]) -> Diff {
    let new_set: BTreeSet<&Post> = new.iter().collect();
    let old_set: BTreeSet<&Post> = old.iter().collect();

    Diff {
        added: new_set.difference(&old_set).map(|p| (*p).clone()).collect(),
        removed: old_set.difference(&new_set).map(|p| (*p).clone()).collect(),
    }
}
