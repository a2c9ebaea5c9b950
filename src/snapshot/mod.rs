//! Snapshot cache: a consistent, sorted, indexed copy of the registry.

pub mod cache;
pub mod frame;
pub mod index;

pub use cache::{CacheState, RefreshOutcome, SnapshotCache};
pub use frame::Snapshot;
pub use index::RowIndex;
