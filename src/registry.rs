//! In-memory connection registry backed by a `parking_lot::RwLock`.
//!
//! [`LockedRegistry`] is a small, self-contained owner of a peer list for
//! embedding applications and tests. Writers (`connect`, `disconnect`,
//! `update`) take the write lock; the snapshot cache only ever calls
//! [`try_read_peers`](ConnectionRegistry::try_read_peers), which fails fast
//! instead of waiting while a writer is active.
//!
//! ## Example Usage
//!
//! ```
//! use peertable::record::PeerRecord;
//! use peertable::registry::LockedRegistry;
//! use peertable::traits::ConnectionRegistry;
//!
//! let registry = LockedRegistry::new();
//! registry.connect(PeerRecord::new(1, "10.0.0.1:8333", "/a/"));
//!
//! let held = registry.write();
//! assert!(registry.try_read_peers().is_none());
//! drop(held);
//! assert!(registry.try_read_peers().is_some());
//! ```

use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::record::NodeId;
use crate::traits::{ConnectionRegistry, PeerStats};

/// Peer list guarded by a read-write lock.
///
/// Peers are kept in connection order, which is the "natural" order an
/// unsorted snapshot shows.
#[derive(Debug)]
pub struct LockedRegistry<P> {
    peers: RwLock<Vec<P>>,
}

impl<P> Default for LockedRegistry<P> {
    fn default() -> Self {
        Self {
            peers: RwLock::new(Vec::new()),
        }
    }
}

impl<P: PeerStats> LockedRegistry<P> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            peers: RwLock::new(Vec::new()),
        }
    }

    /// Creates a registry holding `peers` in the given order.
    pub fn with_peers(peers: Vec<P>) -> Self {
        Self {
            peers: RwLock::new(peers),
        }
    }

    /// Adds a peer at the end of the list.
    ///
    /// A peer whose id is already registered replaces the existing entry in
    /// place, so ids stay unique.
    pub fn connect(&self, peer: P) {
        let mut peers = self.peers.write();
        let id = peer.node_id();
        match peers.iter_mut().find(|p| p.node_id() == id) {
            Some(slot) => *slot = peer,
            None => peers.push(peer),
        }
    }

    /// Removes a peer, preserving the order of the others.
    pub fn disconnect(&self, node_id: NodeId) -> Option<P> {
        let mut peers = self.peers.write();
        let pos = peers.iter().position(|p| p.node_id() == node_id)?;
        Some(peers.remove(pos))
    }

    /// Mutates a peer in place. Returns `false` if the id is not registered.
    pub fn update<F>(&self, node_id: NodeId, f: F) -> bool
    where
        F: FnOnce(&mut P),
    {
        let mut peers = self.peers.write();
        match peers.iter_mut().find(|p| p.node_id() == node_id) {
            Some(peer) => {
                f(peer);
                true
            },
            None => false,
        }
    }

    /// Returns the number of registered peers (blocking read).
    pub fn len(&self) -> usize {
        self.peers.read().len()
    }

    /// Returns `true` if no peers are registered (blocking read).
    pub fn is_empty(&self) -> bool {
        self.peers.read().is_empty()
    }

    /// Acquires the write lock and hands out the guard.
    ///
    /// While the guard lives every `try_read_peers` call fails.
    pub fn write(&self) -> RwLockWriteGuard<'_, Vec<P>> {
        self.peers.write()
    }
}

impl<P: PeerStats> ConnectionRegistry for LockedRegistry<P> {
    type Peer = P;
    type Guard<'a>
        = MappedRwLockReadGuard<'a, [P]>
    where
        Self: 'a;

    fn try_read_peers(&self) -> Option<Self::Guard<'_>> {
        let guard = self.peers.try_read()?;
        Some(RwLockReadGuard::map(guard, |peers| peers.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::PeerRecord;

    fn peer(id: NodeId) -> PeerRecord {
        PeerRecord::new(id, format!("10.0.0.{id}:8333"), "/test/")
    }

    #[test]
    fn connect_appends_in_order() {
        let registry = LockedRegistry::new();
        registry.connect(peer(3));
        registry.connect(peer(1));

        let peers = registry.try_read_peers().unwrap();
        let ids: Vec<_> = peers.iter().map(|p| p.node_id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn connect_existing_id_replaces() {
        let registry = LockedRegistry::new();
        registry.connect(peer(1));
        registry.connect(peer(1).with_ping(0.5));

        assert_eq!(registry.len(), 1);
        let peers = registry.try_read_peers().unwrap();
        assert_eq!(peers[0].ping_time, Some(0.5));
    }

    #[test]
    fn disconnect_preserves_order() {
        let registry = LockedRegistry::with_peers(vec![peer(1), peer(2), peer(3)]);
        assert_eq!(registry.disconnect(2).map(|p| p.node_id), Some(2));
        assert!(registry.disconnect(2).is_none());

        let peers = registry.try_read_peers().unwrap();
        let ids: Vec<_> = peers.iter().map(|p| p.node_id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn update_mutates_in_place() {
        let registry = LockedRegistry::with_peers(vec![peer(1)]);
        assert!(registry.update(1, |p| p.ping_time = Some(0.2)));
        assert!(!registry.update(5, |p| p.ping_time = Some(0.2)));
        assert_eq!(registry.try_read_peers().unwrap()[0].ping_time, Some(0.2));
    }

    #[test]
    fn held_write_lock_blocks_try_read() {
        let registry = LockedRegistry::with_peers(vec![peer(1)]);
        let guard = registry.write();
        assert!(registry.try_read_peers().is_none());
        drop(guard);
        assert!(registry.try_read_peers().is_some());
    }
}
