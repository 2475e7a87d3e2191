use crate::election::engine::{Election, Role, MASTER_TIMEOUT};
use crate::membership::table::PeerTable;
use crate::membership::types::{NodeId, Peer};
use crate::protocol::Message;
use crate::transport::{Channel, Datagram, Link};
use std::time::{Duration, Instant};

/// How often the scheduler runs one pass.
pub const TICK_INTERVAL: Duration = Duration::from_millis(50);

/// Contention backoff: a node broadcasts only after the medium has been
/// quiet (nothing heard, nothing sent) for this long. Not a periodic
/// timer.
pub const SILENT_THRESHOLD: Duration = Duration::from_millis(100);

/// What one scheduler pass did; the runner logs from it and the tests
/// assert on it.
#[derive(Debug, Default)]
pub struct TickOutcome {
    /// Recognized datagrams dispatched this tick.
    pub processed: usize,
    /// Peers evicted this tick.
    pub evicted: usize,
    /// Whether the master liveness timeout forced this recompute.
    pub forced_reelection: bool,
    /// The message broadcast this tick, if the silent window allowed one.
    pub sent: Option<Message>,
}

/// The whole per-node state aggregate, owned by one scheduler loop.
#[derive(Debug)]
pub struct SwarmNode {
    id: NodeId,
    value: i32,
    peers: PeerTable,
    election: Election,
    last_heard: Instant,
    last_sent: Instant,
}

impl SwarmNode {
    pub fn new(id: NodeId, now: Instant) -> Self {
        Self {
            id,
            value: 0,
            peers: PeerTable::new(),
            election: Election::new(id, now),
            last_heard: now,
            last_sent: now,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn role(&self) -> Role {
        self.election.role()
    }

    pub fn leader(&self) -> Option<NodeId> {
        self.election.leader()
    }

    pub fn is_master(&self) -> bool {
        self.election.is_master()
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    pub fn peers(&self) -> impl Iterator<Item = &Peer> {
        self.peers.iter()
    }

    /// One scheduler pass over both channels.
    ///
    /// `value` is the externally sensed reading for this tick; `now` comes
    /// from the caller so tests can drive time explicitly.
    pub fn tick(
        &mut self,
        now: Instant,
        value: i32,
        coordination: &mut dyn Link,
        telemetry: &mut dyn Link,
    ) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        self.value = value;

        // Drain everything already waiting; never wait for more.
        while let Some(datagram) = coordination.try_recv() {
            if self.dispatch(Channel::Coordination, &datagram, now) {
                outcome.processed += 1;
            }
        }
        while let Some(datagram) = telemetry.try_recv() {
            if self.dispatch(Channel::Telemetry, &datagram, now) {
                outcome.processed += 1;
            }
        }

        outcome.evicted = self.peers.evict_stale(now);

        if self.election.master_timed_out(now) {
            outcome.forced_reelection = true;
            tracing::warn!(
                "node {}: master {} silent for over {:?}, forcing re-election",
                self.id,
                self.election.leader().map(|l| l.to_string()).unwrap_or_default(),
                MASTER_TIMEOUT
            );
        }

        if let Some(change) = self.election.recompute(self.value, &self.peers, now) {
            match change.previous {
                Some(previous) => tracing::info!(
                    "node {}: leader changed {} -> {}",
                    self.id,
                    previous,
                    change.current
                ),
                None => tracing::info!("node {}: leader elected {}", self.id, change.current),
            }
            if self.is_master() {
                tracing::info!("node {}: promoted to MASTER", self.id);
            }
        }

        if self.medium_quiet(now) {
            outcome.sent = Some(self.broadcast(coordination, telemetry, now));
        }

        outcome
    }

    /// Routes one datagram. Returns whether it was recognized and applied;
    /// malformed payloads and broadcast echoes of our own packets are
    /// dropped without effect.
    fn dispatch(&mut self, channel: Channel, datagram: &Datagram, now: Instant) -> bool {
        if datagram.from == self.id {
            return false;
        }

        let message = match Message::parse(&datagram.payload) {
            Some(message) => message,
            None => {
                tracing::trace!("node {}: discarding unrecognized payload", self.id);
                return false;
            }
        };

        match message {
            Message::Reading(value) | Message::LeaderAnnounce(value) => {
                self.peers.upsert(datagram.from, value, now);
                self.election.note_heard_from(datagram.from, now);
                self.last_heard = now;
                true
            }
            Message::Reset => {
                if channel != Channel::Telemetry {
                    // Peers never get to reset each other.
                    tracing::debug!(
                        "node {}: ignoring reset on coordination channel from {}",
                        self.id,
                        datagram.from
                    );
                    return false;
                }
                tracing::info!("node {}: reset command received, back to bootstrap", self.id);
                self.apply_reset(now);
                true
            }
        }
    }

    /// Honors a reset command: forget the swarm, forget the leader, restart
    /// every local timer.
    fn apply_reset(&mut self, now: Instant) {
        self.peers.clear();
        self.election.reset(now);
        self.last_heard = now;
        self.last_sent = now;
    }

    fn medium_quiet(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_heard) > SILENT_THRESHOLD
            && now.saturating_duration_since(self.last_sent) > SILENT_THRESHOLD
    }

    fn broadcast(
        &mut self,
        coordination: &mut dyn Link,
        telemetry: &mut dyn Link,
        now: Instant,
    ) -> Message {
        let message = if self.is_master() {
            Message::LeaderAnnounce(self.value)
        } else {
            Message::Reading(self.value)
        };
        let payload = message.encode();

        if let Err(e) = coordination.broadcast(payload.as_bytes()) {
            tracing::warn!("node {}: coordination broadcast failed: {}", self.id, e);
        }
        // The leader also reports itself to the monitor.
        if matches!(message, Message::LeaderAnnounce(_)) {
            if let Err(e) = telemetry.broadcast(payload.as_bytes()) {
                tracing::warn!("node {}: telemetry broadcast failed: {}", self.id, e);
            }
        }

        self.last_sent = now;
        message
    }
}
