//! One consistent `(records, index)` pair.
//!
//! A [`Snapshot`] is built in full off to the side and then swapped into the
//! cache with a single assignment, so a reader sees either the old pair or
//! the new pair and never a mix of old records with a new index.

use rustc_hash::FxHashSet;

use crate::error::InvariantError;
use crate::policy::sort::SortPolicy;
use crate::record::{NodeId, PeerRecord};
use crate::snapshot::index::RowIndex;

/// Ordered peer records plus their row index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    records: Vec<PeerRecord>,
    index: RowIndex,
}

impl Snapshot {
    /// The empty snapshot a cache starts from.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a snapshot from records in registry order.
    ///
    /// Drops any record repeating an earlier record's id (registry order
    /// decides which one survives), stable-sorts under `policy`, then indexes
    /// the final order. Returns the snapshot and the number of records
    /// dropped.
    pub fn build(mut records: Vec<PeerRecord>, policy: SortPolicy) -> (Self, usize) {
        let before = records.len();
        let mut seen = FxHashSet::default();
        seen.reserve(before);
        records.retain(|r| seen.insert(r.node_id));
        let dropped = before - records.len();

        policy.apply(&mut records);
        let index = RowIndex::build(&records);
        (Self { records, index }, dropped)
    }

    /// Number of records.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Bounds-checked row access.
    #[inline]
    pub fn record_at(&self, row: usize) -> Option<&PeerRecord> {
        self.records.get(row)
    }

    /// Row of `node_id` in this snapshot.
    #[inline]
    pub fn row_of(&self, node_id: NodeId) -> Option<usize> {
        self.index.get(node_id)
    }

    /// Records in row order.
    #[inline]
    pub fn records(&self) -> &[PeerRecord] {
        &self.records
    }

    /// The row index.
    #[inline]
    pub fn index(&self) -> &RowIndex {
        &self.index
    }

    /// Verifies that every record is indexed at its own row and that the
    /// index holds nothing else.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.index.len() != self.records.len() {
            return Err(InvariantError::new(format!(
                "row index has {} entries for {} records",
                self.index.len(),
                self.records.len()
            )));
        }
        for (row, record) in self.records.iter().enumerate() {
            match self.index.get(record.node_id) {
                Some(indexed) if indexed == row => {},
                Some(indexed) => {
                    return Err(InvariantError::new(format!(
                        "node {} is at row {} but indexed at row {}",
                        record.node_id, row, indexed
                    )));
                },
                None => {
                    return Err(InvariantError::new(format!(
                        "node {} at row {} is missing from the index",
                        record.node_id, row
                    )));
                },
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::sort::SortOrder;
    use crate::record::PeerColumn;

    fn peer(id: NodeId, address: &str) -> PeerRecord {
        PeerRecord::new(id, address, "/test/")
    }

    #[test]
    fn build_sorts_then_indexes() {
        let policy = SortPolicy::by(PeerColumn::Address, SortOrder::Ascending);
        let (snapshot, dropped) = Snapshot::build(vec![peer(1, "b"), peer(2, "a")], policy);

        assert_eq!(dropped, 0);
        assert_eq!(snapshot.record_at(0).map(|r| r.node_id), Some(2));
        assert_eq!(snapshot.row_of(1), Some(1));
        assert_eq!(snapshot.row_of(2), Some(0));
        assert!(snapshot.check_invariants().is_ok());
    }

    #[test]
    fn duplicate_ids_keep_first_occurrence() {
        let records = vec![peer(1, "first"), peer(2, "x"), peer(1, "second")];
        let (snapshot, dropped) = Snapshot::build(records, SortPolicy::UNSORTED);

        assert_eq!(dropped, 1);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.record_at(0).map(|r| r.address.as_str()), Some("first"));
        assert!(snapshot.check_invariants().is_ok());
    }

    #[test]
    fn record_at_out_of_range_is_none() {
        let (snapshot, _) = Snapshot::build(vec![peer(1, "a")], SortPolicy::UNSORTED);
        assert!(snapshot.record_at(1).is_none());
        assert!(snapshot.record_at(usize::MAX).is_none());
        assert!(Snapshot::empty().record_at(0).is_none());
    }

    #[test]
    fn check_invariants_detects_stale_index() {
        let (mut snapshot, _) = Snapshot::build(vec![peer(1, "a"), peer(2, "b")], SortPolicy::UNSORTED);
        snapshot.records.swap(0, 1);
        let err = snapshot.check_invariants().unwrap_err();
        assert!(err.message().contains("indexed at row"));
    }
}
