//! Wire Protocol Definitions
//!
//! The swarm speaks a tiny ASCII datagram protocol over two broadcast
//! channels: a coordination channel for node-to-node traffic and a telemetry
//! channel toward the monitor, which doubles as the monitor's control
//! channel back into the swarm.
//!
//! Payloads are recognized by fixed textual prefix; anything else is
//! silently discarded. The sender's identity is never in the payload; the
//! transport carries it.

pub mod codec;

pub use codec::{Message, MAX_DATAGRAM_LEN};
