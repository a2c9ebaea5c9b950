//! Column sort policy for peer snapshots.
//!
//! A [`SortPolicy`] pairs an optional [`PeerColumn`] with a [`SortOrder`] and
//! orders a freshly copied snapshot before its row index is built.
//!
//! ## Architecture
//!
//! ```text
//!   compare(left, right)
//!   ─────────────────────────────────────────────────────────────────
//!
//!     order == Descending ?
//!        │ yes                         │ no
//!        ▼                             ▼
//!     (l, r) = (right, left)        (l, r) = (left, right)
//!        │                             │
//!        └──────────────┬──────────────┘
//!                       ▼
//!     column ─┬─ Address    → l.address.cmp(&r.address)
//!             ├─ SubVersion → l.sub_version.cmp(&r.sub_version)
//!             ├─ Ping       → ping_cmp(l.ping_time, r.ping_time)
//!             └─ None       → Equal (registry order kept)
//! ```
//!
//! Descending order swaps the operands instead of reversing the result, so
//! records with equal keys still compare `Equal` and keep their pre-sort
//! relative order under the stable sort.
//!
//! ## Key Concepts
//!
//! - **Stable**: [`SortPolicy::apply`] uses `slice::sort_by`, a merge-based
//!   stable sort. Rows with tied keys never swap between refreshes, so the
//!   table does not jitter when pings fluctuate inside a tie.
//! - **Byte-wise text**: addresses and sub-versions compare case-sensitively
//!   by their UTF-8 bytes.
//! - **Unknown ping**: a peer without a measured ping sorts after every
//!   measured one in ascending order (and before them in descending order).
//!   Measured pings use `f64::total_cmp`, which keeps the order total.
//!
//! ## Example Usage
//!
//! ```
//! use peertable::policy::sort::{SortOrder, SortPolicy};
//! use peertable::record::{PeerColumn, PeerRecord};
//!
//! let mut peers = vec![PeerRecord::new(1, "b", "x"), PeerRecord::new(2, "a", "x")];
//! SortPolicy::by(PeerColumn::Address, SortOrder::Ascending).apply(&mut peers);
//! assert_eq!(peers[0].node_id, 2);
//! ```

use std::cmp::Ordering;

use crate::record::{PeerColumn, PeerRecord};

/// Direction of a column sort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    /// Smallest key first.
    #[default]
    Ascending,
    /// Largest key first.
    Descending,
}

/// Active column and direction applied to each refreshed snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SortPolicy {
    column: Option<PeerColumn>,
    order: SortOrder,
}

impl SortPolicy {
    /// Registry order, no comparison applied.
    pub const UNSORTED: SortPolicy = SortPolicy {
        column: None,
        order: SortOrder::Ascending,
    };

    /// Creates a policy; `column == None` keeps registry order.
    #[inline]
    pub fn new(column: Option<PeerColumn>, order: SortOrder) -> Self {
        Self { column, order }
    }

    /// Creates a policy sorting by `column`.
    #[inline]
    pub fn by(column: PeerColumn, order: SortOrder) -> Self {
        Self::new(Some(column), order)
    }

    /// Returns the sort column, `None` when unsorted.
    #[inline]
    pub fn column(&self) -> Option<PeerColumn> {
        self.column
    }

    /// Returns the sort direction.
    #[inline]
    pub fn order(&self) -> SortOrder {
        self.order
    }

    /// Returns `true` if a column is selected.
    #[inline]
    pub fn is_sorted(&self) -> bool {
        self.column.is_some()
    }

    /// Compares two records under this policy.
    ///
    /// Returns `Equal` for every pair when no column is selected.
    pub fn compare(&self, left: &PeerRecord, right: &PeerRecord) -> Ordering {
        let Some(column) = self.column else {
            return Ordering::Equal;
        };
        let (l, r) = match self.order {
            SortOrder::Ascending => (left, right),
            SortOrder::Descending => (right, left),
        };
        compare_column(column, l, r)
    }

    /// Strict "left sorts before right" decision.
    #[inline]
    pub fn is_less(&self, left: &PeerRecord, right: &PeerRecord) -> bool {
        self.compare(left, right) == Ordering::Less
    }

    /// Stable-sorts `records` in place. No-op when unsorted.
    pub fn apply(&self, records: &mut [PeerRecord]) {
        if self.column.is_none() {
            return;
        }
        records.sort_by(|a, b| self.compare(a, b));
    }
}

/// Ascending comparison of two records on a single column.
pub fn compare_column(column: PeerColumn, left: &PeerRecord, right: &PeerRecord) -> Ordering {
    match column {
        PeerColumn::Address => left.address.as_bytes().cmp(right.address.as_bytes()),
        PeerColumn::SubVersion => left.sub_version.as_bytes().cmp(right.sub_version.as_bytes()),
        PeerColumn::Ping => ping_cmp(left.ping_time, right.ping_time),
    }
}

// Unknown sorts last in ascending order.
fn ping_cmp(left: Option<f64>, right: Option<f64>) -> Ordering {
    match (left, right) {
        (Some(l), Some(r)) => l.total_cmp(&r),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn records_from(pings: &[u8]) -> Vec<PeerRecord> {
        pings
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                PeerRecord::new(i as i64, format!("peer-{}", p % 3), "/p/").with_ping(f64::from(p) / 100.0)
            })
            .collect()
    }

    fn order_strategy() -> impl Strategy<Value = SortOrder> {
        prop_oneof![Just(SortOrder::Ascending), Just(SortOrder::Descending)]
    }

    fn column_strategy() -> impl Strategy<Value = PeerColumn> {
        prop_oneof![
            Just(PeerColumn::Address),
            Just(PeerColumn::SubVersion),
            Just(PeerColumn::Ping),
        ]
    }

    proptest! {
        /// Records with tied keys keep their registry order.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_ties_keep_relative_order(
            pings in prop::collection::vec(0u8..5, 0..64),
            column in column_strategy(),
            order in order_strategy(),
        ) {
            let mut peers = records_from(&pings);
            let policy = SortPolicy::by(column, order);
            policy.apply(&mut peers);

            for pair in peers.windows(2) {
                if policy.compare(&pair[0], &pair[1]) == Ordering::Equal {
                    // node ids were assigned in registry order
                    prop_assert!(pair[0].node_id < pair[1].node_id);
                }
            }
        }

        /// Output is ordered under the policy's comparator.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_output_is_sorted(
            pings in prop::collection::vec(0u8..200, 0..64),
            column in column_strategy(),
            order in order_strategy(),
        ) {
            let mut peers = records_from(&pings);
            let policy = SortPolicy::by(column, order);
            policy.apply(&mut peers);

            for pair in peers.windows(2) {
                prop_assert!(!policy.is_less(&pair[1], &pair[0]));
            }
            prop_assert_eq!(peers.len(), pings.len());
        }
    }
}
