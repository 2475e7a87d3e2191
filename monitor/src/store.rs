//! Telemetry Store
//!
//! Everything the monitor remembers about the swarm: a bounded window of
//! raw readings, the latest state per node, and cumulative leadership
//! durations derived from `MASTER:` transitions. Shared between the UDP
//! ingest task and the HTTP handlers, so the maps are concurrent and the
//! window sits behind a short-lived lock.

use dashmap::DashMap;
use light_swarm::membership::types::NodeId;
use light_swarm::protocol::Message;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// How much reading history the dashboard keeps.
pub const TIME_WINDOW: Duration = Duration::from_secs(30);
pub const MAX_DATA_POINTS: usize = 1000;

/// One telemetry datagram as received: sender, value, arrival time, and
/// whether the sender announced itself as master.
#[derive(Debug, Clone, Serialize)]
pub struct DataPoint {
    pub timestamp_ms: u64,
    pub sender: NodeId,
    pub value: i32,
    pub is_master: bool,
    #[serde(skip)]
    received_at: Instant,
}

/// Latest known state of one node.
#[derive(Debug, Clone, Serialize)]
pub struct NodeState {
    pub value: i32,
    pub is_master: bool,
    pub last_update_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MasterSummary {
    pub id: NodeId,
    pub value: i32,
}

/// Tracks the node currently announcing mastership; `last_stamp` is the
/// arrival time of its most recent announcement, so duration accrues
/// between consecutive announcements from the same sender.
#[derive(Debug, Clone, Copy)]
struct MasterStint {
    id: NodeId,
    last_stamp: Instant,
}

#[derive(Default)]
pub struct TelemetryStore {
    points: Mutex<VecDeque<DataPoint>>,
    nodes: DashMap<NodeId, NodeState>,
    durations: DashMap<NodeId, Duration>,
    master: Mutex<Option<MasterStint>>,
}

impl TelemetryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one parsed telemetry datagram. Reset commands are the
    /// monitor's own control traffic echoed back and carry no data.
    pub fn record(&self, sender: NodeId, message: Message, now: Instant) {
        match message {
            Message::Reading(value) => self.record_point(sender, value, false, now),
            Message::LeaderAnnounce(value) => {
                self.advance_master(sender, now);
                self.record_point(sender, value, true, now);
            }
            Message::Reset => {}
        }
    }

    fn record_point(&self, sender: NodeId, value: i32, is_master: bool, now: Instant) {
        let timestamp_ms = epoch_ms();

        self.nodes.insert(
            sender,
            NodeState {
                value,
                is_master,
                last_update_ms: timestamp_ms,
            },
        );

        let mut points = self.points.lock().expect("store lock poisoned");
        if points.len() == MAX_DATA_POINTS {
            points.pop_front();
        }
        points.push_back(DataPoint {
            timestamp_ms,
            sender,
            value,
            is_master,
            received_at: now,
        });
    }

    /// Applies one `MASTER:` announcement to the duration accounting. Time
    /// accrues between consecutive announcements from the same sender; a
    /// change of sender starts a fresh stint from now.
    fn advance_master(&self, sender: NodeId, now: Instant) {
        let mut master = self.master.lock().expect("store lock poisoned");

        match *master {
            Some(stint) if stint.id == sender => {
                let elapsed = now.saturating_duration_since(stint.last_stamp);
                *self.durations.entry(sender).or_insert(Duration::ZERO) += elapsed;
            }
            Some(previous) => {
                tracing::info!("master handover: {} -> {}", previous.id, sender);
                self.durations.entry(sender).or_insert(Duration::ZERO);
            }
            None => {
                tracing::info!("first master observed: {}", sender);
                self.durations.entry(sender).or_insert(Duration::ZERO);
            }
        }
        *master = Some(MasterStint { id: sender, last_stamp: now });

        for mut entry in self.nodes.iter_mut() {
            if *entry.key() != sender {
                entry.value_mut().is_master = false;
            }
        }
    }

    /// Drops reading history older than [`TIME_WINDOW`].
    pub fn prune(&self, now: Instant) {
        let mut points = self.points.lock().expect("store lock poisoned");
        while let Some(point) = points.front() {
            if now.saturating_duration_since(point.received_at) > TIME_WINDOW {
                points.pop_front();
            } else {
                break;
            }
        }
    }

    /// Forgets everything; called when the swarm is reset so the next
    /// observation session starts clean.
    pub fn clear(&self) {
        self.points.lock().expect("store lock poisoned").clear();
        self.nodes.clear();
        self.durations.clear();
        *self.master.lock().expect("store lock poisoned") = None;
        tracing::info!("telemetry store cleared");
    }

    pub fn current_master(&self) -> Option<MasterSummary> {
        let master = self.master.lock().expect("store lock poisoned");
        master.as_ref().and_then(|stint| {
            self.nodes.get(&stint.id).map(|state| MasterSummary {
                id: stint.id,
                value: state.value,
            })
        })
    }

    pub fn nodes_snapshot(&self) -> Vec<(NodeId, NodeState)> {
        self.nodes
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }

    pub fn data_window(&self) -> Vec<DataPoint> {
        self.points
            .lock()
            .expect("store lock poisoned")
            .iter()
            .cloned()
            .collect()
    }

    /// Cumulative leadership per node, in seconds.
    pub fn durations_secs(&self) -> Vec<(NodeId, f64)> {
        self.durations
            .iter()
            .map(|entry| (*entry.key(), entry.value().as_secs_f64()))
            .collect()
    }
}

fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
