//! Membership reconciliation between an existing and a desired track set.
//!
//! Both inputs are treated as sets: duplicates collapse and order is
//! irrelevant. The resulting diff is what must be removed from and added to
//! the existing set so that it equals the desired set.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::types::DbId;

/// The `(to_add, to_remove)` partition produced by [`reconcile`].
///
/// Both vectors are duplicate-free and sorted ascending, so applying them
/// always touches join rows in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MembershipDiff {
    pub to_add: Vec<DbId>,
    pub to_remove: Vec<DbId>,
}

impl MembershipDiff {
    /// A diff with nothing to add or remove. Callers must issue no writes.
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Compute `to_add = desired - existing` and `to_remove = existing - desired`.
pub fn reconcile(existing: &[DbId], desired: &[DbId]) -> MembershipDiff {
    let existing: BTreeSet<DbId> = existing.iter().copied().collect();
    let desired: BTreeSet<DbId> = desired.iter().copied().collect();

    MembershipDiff {
        to_add: desired.difference(&existing).copied().collect(),
        to_remove: existing.difference(&desired).copied().collect(),
    }
}

/// Collapse a caller-supplied id list into a sorted set.
pub fn dedup_ids(ids: &[DbId]) -> Vec<DbId> {
    ids.iter()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Diff for an incremental addition: ids not yet present are added.
pub fn additions(existing: &[DbId], extra: &[DbId]) -> MembershipDiff {
    let existing_set: BTreeSet<DbId> = existing.iter().copied().collect();
    MembershipDiff {
        to_add: dedup_ids(extra)
            .into_iter()
            .filter(|id| !existing_set.contains(id))
            .collect(),
        to_remove: Vec::new(),
    }
}

/// Diff for an incremental removal: only ids actually present are removed.
pub fn removals(existing: &[DbId], gone: &[DbId]) -> MembershipDiff {
    let existing_set: BTreeSet<DbId> = existing.iter().copied().collect();
    MembershipDiff {
        to_add: Vec::new(),
        to_remove: dedup_ids(gone)
            .into_iter()
            .filter(|id| existing_set.contains(id))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_sets() {
        let diff = reconcile(&[1, 2, 3], &[2, 3, 4]);
        assert_eq!(diff.to_add, vec![4]);
        assert_eq!(diff.to_remove, vec![1]);
    }

    #[test]
    fn empty_desired_removes_everything() {
        let diff = reconcile(&[3, 1, 2], &[]);
        assert!(diff.to_add.is_empty());
        assert_eq!(diff.to_remove, vec![1, 2, 3]);
    }

    #[test]
    fn empty_existing_adds_everything() {
        let diff = reconcile(&[], &[5, 4]);
        assert_eq!(diff.to_add, vec![4, 5]);
        assert!(diff.to_remove.is_empty());
    }

    #[test]
    fn duplicates_in_desired_collapse() {
        let diff = reconcile(&[], &[1, 1, 2]);
        assert_eq!(diff.to_add, vec![1, 2]);
    }

    #[test]
    fn equal_sets_are_a_noop() {
        let diff = reconcile(&[1, 2, 3], &[3, 2, 1, 1]);
        assert!(diff.is_empty());
        assert_eq!(diff, MembershipDiff::default());
    }

    #[test]
    fn both_empty_is_a_noop() {
        assert!(reconcile(&[], &[]).is_empty());
    }

    #[test]
    fn disjoint_sets_swap_completely() {
        let diff = reconcile(&[1, 2], &[3, 4]);
        assert_eq!(diff.to_add, vec![3, 4]);
        assert_eq!(diff.to_remove, vec![1, 2]);
    }

    #[test]
    fn applying_diff_converges_on_desired() {
        let existing = vec![7, 8, 9, 10];
        let desired = vec![10, 11, 7, 11];
        let diff = reconcile(&existing, &desired);

        let mut result: BTreeSet<DbId> = existing.into_iter().collect();
        for id in &diff.to_remove {
            assert!(result.remove(id));
        }
        for id in &diff.to_add {
            assert!(result.insert(*id));
        }
        assert_eq!(result, desired.into_iter().collect());
    }

    #[test]
    fn dedup_sorts_and_collapses() {
        assert_eq!(dedup_ids(&[3, 1, 3, 2, 1]), vec![1, 2, 3]);
        assert!(dedup_ids(&[]).is_empty());
    }

    #[test]
    fn additions_skip_existing_members() {
        let diff = additions(&[1, 2], &[2, 3, 3]);
        assert_eq!(diff.to_add, vec![3]);
        assert!(diff.to_remove.is_empty());
    }

    #[test]
    fn removals_skip_non_members() {
        let diff = removals(&[1, 2], &[2, 5]);
        assert_eq!(diff.to_remove, vec![2]);
        assert!(diff.to_add.is_empty());
    }
}
