//! `node_id -> row` index over one snapshot.
//!
//! Rebuilt wholesale from the final (sorted) record order every refresh,
//! never patched incrementally.

use rustc_hash::FxHashMap;

use crate::record::{NodeId, PeerRecord};

/// Maps each node id in a snapshot to its row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowIndex {
    rows: FxHashMap<NodeId, usize>,
}

impl RowIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes `records` by position. Ids must already be unique.
    pub fn build(records: &[PeerRecord]) -> Self {
        let mut rows = FxHashMap::default();
        rows.reserve(records.len());
        for (row, record) in records.iter().enumerate() {
            rows.insert(record.node_id, row);
        }
        Self { rows }
    }

    /// Row of `node_id`, `None` if the peer is not in this snapshot.
    #[inline]
    pub fn get(&self, node_id: NodeId) -> Option<usize> {
        self.rows.get(&node_id).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates `(node_id, row)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, usize)> + '_ {
        self.rows.iter().map(|(&id, &row)| (id, row))
    }
}
