use crate::membership::table::PeerTable;
use crate::membership::types::NodeId;
use serde::Serialize;
use std::time::{Duration, Instant};

/// A believed leader that stays silent for longer than this triggers a
/// forced re-election on the next tick.
pub const MASTER_TIMEOUT: Duration = Duration::from_millis(3000);

/// The local node's position in the swarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// No leader computation has run yet (initial state, and the state every
    /// reset command returns to).
    Bootstrap,
    Follower,
    Master,
}

/// Emitted whenever a recompute lands on a different leader than before.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaderChange {
    pub previous: Option<NodeId>,
    pub current: NodeId,
}

/// Selects the leader from the local reading plus the peer table.
///
/// Pure function: scans `{own} U peers`, picks the maximum value, and breaks
/// value ties by the smallest [`NodeId`]. Two nodes observing the same
/// membership snapshot always compute the same leader.
pub fn compute_leader(own_id: NodeId, own_value: i32, peers: &PeerTable) -> NodeId {
    let mut best_id = own_id;
    let mut best_value = own_value;

    for peer in peers.iter() {
        if peer.value > best_value || (peer.value == best_value && peer.id < best_id) {
            best_id = peer.id;
            best_value = peer.value;
        }
    }

    best_id
}

/// Per-node election state: believed leader, derived role, and the master
/// liveness timer.
#[derive(Debug)]
pub struct Election {
    own_id: NodeId,
    role: Role,
    leader: Option<NodeId>,
    last_master_seen: Instant,
}

impl Election {
    pub fn new(own_id: NodeId, now: Instant) -> Self {
        Self {
            own_id,
            role: Role::Bootstrap,
            leader: None,
            last_master_seen: now,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn leader(&self) -> Option<NodeId> {
        self.leader
    }

    /// Holds the invariant `is_master() == (leader == own identity)`.
    pub fn is_master(&self) -> bool {
        self.role == Role::Master
    }

    /// Called for every dispatched reading or announcement: a message from
    /// the believed leader refreshes the liveness timer.
    pub fn note_heard_from(&mut self, sender: NodeId, now: Instant) {
        if self.leader == Some(sender) {
            self.last_master_seen = now;
        }
    }

    /// Master liveness check; runs before each recompute.
    ///
    /// Fires when the believed leader is some other node and nothing has
    /// been heard from it for more than [`MASTER_TIMEOUT`]. The timer is
    /// refreshed so the trigger does not fire again every tick. The stale
    /// leader's membership entry is deliberately left in place: if its last
    /// reported value is still the table maximum, the recompute re-selects
    /// the same unreachable identity until the entry ages out of the peer
    /// table. That matches the deployed firmware's behavior and is covered
    /// as a known convergence-delay edge case in the tests.
    pub fn master_timed_out(&mut self, now: Instant) -> bool {
        match self.leader {
            Some(leader)
                if leader != self.own_id
                    && now.saturating_duration_since(self.last_master_seen) > MASTER_TIMEOUT =>
            {
                self.last_master_seen = now;
                true
            }
            _ => false,
        }
    }

    /// Recomputes the leader from the current snapshot and applies the role
    /// transition. Returns a [`LeaderChange`] when the result differs from
    /// the previously believed leader.
    pub fn recompute(
        &mut self,
        own_value: i32,
        peers: &PeerTable,
        now: Instant,
    ) -> Option<LeaderChange> {
        let elected = compute_leader(self.own_id, own_value, peers);
        let previous = self.leader;

        self.leader = Some(elected);
        self.role = if elected == self.own_id {
            Role::Master
        } else {
            Role::Follower
        };

        if previous != Some(elected) {
            // A freshly elected leader gets a full liveness window.
            self.last_master_seen = now;
            Some(LeaderChange { previous, current: elected })
        } else {
            None
        }
    }

    /// Returns to the bootstrap state: no leader, not master, timer at now.
    pub fn reset(&mut self, now: Instant) {
        self.role = Role::Bootstrap;
        self.leader = None;
        self.last_master_seen = now;
    }
}
