//! Broadcast Transport Module
//!
//! The protocol only ever needs one capability per channel: "hand me the
//! next already-arrived datagram, or nothing" plus a best-effort broadcast
//! send. [`Link`] captures exactly that contract so the scheduler keeps its
//! ordering and timing guarantees no matter what carries the bytes:
//! [`udp::UdpLink`] over real UDP broadcast sockets in deployment, or
//! [`memory::MemoryBus`] for running a whole swarm inside one test process.
//!
//! Delivery is best effort everywhere: datagrams may be lost, duplicated or
//! reordered, and the protocol above is built to absorb all three.

pub mod memory;
pub mod udp;

use crate::membership::types::NodeId;

/// Which of the node's two channels a datagram arrived on. The reset
/// command is only honored from the telemetry channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Node-to-node coordination traffic.
    Coordination,
    /// Node-to-monitor telemetry and monitor-to-swarm control.
    Telemetry,
}

/// A received broadcast payload. The sender's identity comes from the
/// transport layer, never from the payload itself.
#[derive(Debug, Clone)]
pub struct Datagram {
    pub from: NodeId,
    pub payload: Vec<u8>,
}

/// Non-blocking broadcast link.
///
/// `try_recv` must return immediately: `None` means "no packet right now",
/// never "wait". `broadcast` is fire-and-forget toward every other member
/// of the medium.
pub trait Link: Send {
    fn try_recv(&mut self) -> Option<Datagram>;
    fn broadcast(&mut self, payload: &[u8]) -> anyhow::Result<()>;
}
