use super::types::{NodeId, Peer};
use std::time::{Duration, Instant};

/// Maximum number of peers tracked at once. Once full, new identities are
/// refused until eviction frees a slot.
pub const MAX_PEERS: usize = 10;

/// A peer that stays silent for longer than this is dropped from the table,
/// whatever its role was.
pub const DEVICE_TIMEOUT: Duration = Duration::from_millis(5000);

/// Bounded collection of known peers.
///
/// Owned exclusively by one node's scheduler loop; a plain `Vec` with linear
/// scans is all the structure ten entries need.
#[derive(Debug, Default)]
pub struct PeerTable {
    peers: Vec<Peer>,
}

impl PeerTable {
    pub fn new() -> Self {
        Self { peers: Vec::with_capacity(MAX_PEERS) }
    }

    /// Records a reading from `id` at `now`.
    ///
    /// Existing entries are overwritten (idempotent on the timestamp
    /// refresh). A new identity is inserted only while the table is under
    /// capacity; otherwise it is refused and `false` is returned. Refusal is
    /// a documented scaling limit, not an error.
    pub fn upsert(&mut self, id: NodeId, value: i32, now: Instant) -> bool {
        if let Some(peer) = self.peers.iter_mut().find(|p| p.id == id) {
            peer.value = value;
            peer.last_seen = now;
            return true;
        }

        if self.peers.len() >= MAX_PEERS {
            tracing::debug!("peer table full, refusing new peer {}", id);
            return false;
        }

        tracing::debug!("tracking new peer {} (value={})", id, value);
        self.peers.push(Peer { id, value, last_seen: now });
        true
    }

    /// Drops every entry not heard from within [`DEVICE_TIMEOUT`].
    ///
    /// Returns how many peers were removed. Removed entries are excluded
    /// from the election as of the next recompute.
    pub fn evict_stale(&mut self, now: Instant) -> usize {
        let before = self.peers.len();
        self.peers.retain(|peer| {
            let silent_for = now.saturating_duration_since(peer.last_seen);
            if silent_for > DEVICE_TIMEOUT {
                tracing::info!("peer {} lost (silent for {:?})", peer.id, silent_for);
                false
            } else {
                true
            }
        });
        before - self.peers.len()
    }

    pub fn get(&self, id: &NodeId) -> Option<&Peer> {
        self.peers.iter().find(|p| &p.id == id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Peer> {
        self.peers.iter()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn clear(&mut self) {
        self.peers.clear();
    }
}
