//! Error types for the peertable library.
//!
//! ## Key Components
//!
//! - [`InvariantError`]: Returned when the snapshot's records and row index
//!   disagree (debug `check_invariants` methods).
//! - [`ConfigError`]: Returned when table configuration parameters are invalid
//!   (e.g. zero refresh interval, unknown sort column index).
//!
//! Registry contention is deliberately absent here: a refresh that cannot
//! acquire the registry reports [`RefreshOutcome::Skipped`](crate::snapshot::RefreshOutcome)
//! instead of an error.
//!
//! ## Example Usage
//!
//! ```
//! use std::time::Duration;
//!
//! use peertable::builder::PeerTableBuilder;
//! use peertable::error::ConfigError;
//!
//! let bad: Result<PeerTableBuilder, ConfigError> =
//!     PeerTableBuilder::new().try_refresh_interval(Duration::ZERO);
//! assert!(bad.is_err());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when snapshot invariants are violated.
///
/// Produced by [`Snapshot::check_invariants`](crate::snapshot::Snapshot::check_invariants)
/// and [`SnapshotCache::check_invariants`](crate::snapshot::SnapshotCache::check_invariants).
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    #[inline]
    pub fn new(description: impl Into<String>) -> Self {
        Self(description.into())
    }

    /// What went wrong, without the type name.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when table configuration parameters are invalid.
///
/// Produced by fallible builder methods such as
/// [`PeerTableBuilder::try_refresh_interval`](crate::builder::PeerTableBuilder::try_refresh_interval)
/// and [`PeerTableBuilder::try_build`](crate::builder::PeerTableBuilder::try_build).
///
/// # Example
///
/// ```
/// use peertable::builder::PeerTableBuilder;
/// use peertable::policy::sort::SortOrder;
///
/// let err = PeerTableBuilder::new()
///     .try_sort_by_index(7, SortOrder::Ascending)
///     .unwrap_err();
/// assert!(err.to_string().contains("column"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    #[inline]
    pub fn new(description: impl Into<String>) -> Self {
        Self(description.into())
    }

    /// What went wrong, without the type name.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}
