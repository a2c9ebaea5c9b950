//! Ordering policies applied to refreshed snapshots.

pub mod sort;

pub use sort::{SortOrder, SortPolicy};
