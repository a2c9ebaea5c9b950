//! Per-snapshot peer values and the columns a table shows for them.
//!
//! A [`PeerRecord`] is a deep copy of one peer's statistics taken while the
//! registry's read guard was held. Once copied it never changes; the next
//! refresh produces a fresh set of records.
//!
//! ## Example Usage
//!
//! ```
//! use peertable::record::{PeerColumn, PeerRecord};
//!
//! let peer = PeerRecord::new(7, "10.0.0.7:8333", "/Satoshi:0.9.0/").with_ping(0.0421);
//! assert_eq!(peer.node_id, 7);
//! assert_eq!(PeerColumn::from_index(2), Some(PeerColumn::Ping));
//! ```

/// Registry-assigned identifier of a live connection.
///
/// Unique among active connections and never reused while a connection is
/// open. Assigned by the registry, never by this crate.
pub type NodeId = i64;

/// Statistics of one peer at refresh time.
#[derive(Debug, Clone, PartialEq)]
pub struct PeerRecord {
    /// Registry identifier, unique within a snapshot.
    pub node_id: NodeId,
    /// Human-readable network address or name.
    pub address: String,
    /// Peer-reported software identifier.
    pub sub_version: String,
    /// Latest round-trip latency in seconds, `None` while unmeasured.
    pub ping_time: Option<f64>,
}

impl PeerRecord {
    /// Creates a record with an unknown ping time.
    pub fn new(node_id: NodeId, address: impl Into<String>, sub_version: impl Into<String>) -> Self {
        Self {
            node_id,
            address: address.into(),
            sub_version: sub_version.into(),
            ping_time: None,
        }
    }

    /// Sets the measured ping time in seconds.
    pub fn with_ping(mut self, seconds: f64) -> Self {
        self.ping_time = Some(seconds);
        self
    }
}

/// Columns of the peer table, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeerColumn {
    /// Network address of the peer.
    Address,
    /// Software identifier reported by the peer.
    SubVersion,
    /// Round-trip latency.
    Ping,
}

impl PeerColumn {
    /// All columns in display order.
    pub const ALL: [PeerColumn; 3] = [PeerColumn::Address, PeerColumn::SubVersion, PeerColumn::Ping];

    /// Number of columns.
    pub const COUNT: usize = Self::ALL.len();

    /// Zero-based display position.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            PeerColumn::Address => 0,
            PeerColumn::SubVersion => 1,
            PeerColumn::Ping => 2,
        }
    }

    /// Column at a display position, `None` if out of range.
    #[inline]
    pub fn from_index(index: usize) -> Option<PeerColumn> {
        Self::ALL.get(index).copied()
    }

    /// Default header label.
    pub fn default_label(self) -> &'static str {
        match self {
            PeerColumn::Address => "Address",
            PeerColumn::SubVersion => "Subversion",
            PeerColumn::Ping => "Ping (secs)",
        }
    }
}
