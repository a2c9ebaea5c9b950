//! # Collaborator Traits
//!
//! The snapshot cache sits between two collaborators it does not own: the
//! connection registry it reads from and the table projection it feeds.
//! This module defines the seams to both.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────┐
//!   │   ConnectionRegistry         │   owned by the network layer
//!   │                              │
//!   │  try_read_peers(&)           │
//!   │     → Option<Guard<[Peer]>>  │   None = busy, never waits
//!   └──────────────┬───────────────┘
//!                  │ Peer: PeerStats
//!                  ▼
//!   ┌──────────────────────────────┐
//!   │   PeerStats                  │
//!   │                              │
//!   │  node_id(&) → NodeId         │
//!   │  copy_stats(&) → PeerRecord  │   deep copy, no borrow kept
//!   └──────────────┬───────────────┘
//!                  │
//!                  ▼
//!   ┌──────────────────────────────┐        ┌────────────────────────────┐
//!   │   SnapshotCache / table      │ ─────► │   TableObserver            │
//!   │                              │        │                            │
//!   │  refresh / set_sort          │        │  layout_about_to_change(&) │
//!   │                              │        │  layout_changed(&)         │
//!   └──────────────────────────────┘        └────────────────────────────┘
//! ```
//!
//! ## Trait Summary
//!
//! | Trait                | Direction | Purpose                                   |
//! |----------------------|-----------|-------------------------------------------|
//! | `ConnectionRegistry` | consumed  | Non-blocking read access to live peers    |
//! | `PeerStats`          | consumed  | Per-peer stats copy                       |
//! | `TableObserver`      | exposed   | Brackets each refresh for the projection  |
//!
//! ## Thread Safety
//!
//! The registry is expected to be shared with writer threads, so its guard
//! must be released as soon as the copy finishes. Implementations backed by
//! `parking_lot::RwLock` map naturally onto `try_read`.

use std::ops::Deref;
use std::sync::Arc;

use crate::record::{NodeId, PeerRecord};

/// A live peer handle whose statistics can be copied out.
pub trait PeerStats {
    /// Registry identifier of this connection.
    fn node_id(&self) -> NodeId;

    /// Copies the current statistics into an owned record.
    fn copy_stats(&self) -> PeerRecord;
}

impl PeerStats for PeerRecord {
    #[inline]
    fn node_id(&self) -> NodeId {
        self.node_id
    }

    #[inline]
    fn copy_stats(&self) -> PeerRecord {
        self.clone()
    }
}

impl<P: PeerStats + ?Sized> PeerStats for Arc<P> {
    #[inline]
    fn node_id(&self) -> NodeId {
        (**self).node_id()
    }

    #[inline]
    fn copy_stats(&self) -> PeerRecord {
        (**self).copy_stats()
    }
}

/// Owner of the live connection list.
///
/// The only required operation is a **non-blocking** read acquire. If a
/// writer currently holds the list, `try_read_peers` must return `None`
/// immediately rather than wait.
///
/// # Example
///
/// ```
/// use peertable::record::PeerRecord;
/// use peertable::registry::LockedRegistry;
/// use peertable::traits::ConnectionRegistry;
///
/// let registry = LockedRegistry::new();
/// registry.connect(PeerRecord::new(1, "127.0.0.1:8333", "/a/"));
///
/// let peers = registry.try_read_peers().expect("uncontended");
/// assert_eq!(peers.len(), 1);
/// ```
pub trait ConnectionRegistry {
    /// Live peer handle type.
    type Peer: PeerStats;

    /// Read guard over the peer list; dropping it releases the registry.
    type Guard<'a>: Deref<Target = [Self::Peer]>
    where
        Self: 'a;

    /// Attempts to acquire read access without blocking.
    fn try_read_peers(&self) -> Option<Self::Guard<'_>>;
}

impl<R: ConnectionRegistry + ?Sized> ConnectionRegistry for Arc<R> {
    type Peer = R::Peer;
    type Guard<'a>
        = R::Guard<'a>
    where
        Self: 'a;

    #[inline]
    fn try_read_peers(&self) -> Option<Self::Guard<'_>> {
        (**self).try_read_peers()
    }
}

impl<R: ConnectionRegistry + ?Sized> ConnectionRegistry for &R {
    type Peer = R::Peer;
    type Guard<'a>
        = R::Guard<'a>
    where
        Self: 'a;

    #[inline]
    fn try_read_peers(&self) -> Option<Self::Guard<'_>> {
        (**self).try_read_peers()
    }
}

/// Receives the notifications that bracket every refresh.
///
/// `layout_about_to_change` fires before the snapshot is touched and
/// `layout_changed` after it has been replaced (or left alone, if the refresh
/// was skipped). Between the two calls observers must not read the table.
pub trait TableObserver: Send + Sync {
    /// Rows may be about to move, appear or disappear.
    fn layout_about_to_change(&self) {}

    /// Rows are stable again.
    fn layout_changed(&self) {}
}
