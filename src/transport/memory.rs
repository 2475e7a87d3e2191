use super::{Datagram, Link};
use crate::membership::types::NodeId;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// In-memory broadcast medium.
///
/// Stands in for the radio network when a whole swarm runs inside one test
/// process: every [`MemoryLink`] joined to the bus receives what any other
/// member broadcasts. Like the real medium it delivers to everyone except
/// the sender and keeps no history for late joiners.
#[derive(Clone, Default)]
pub struct MemoryBus {
    members: Arc<Mutex<HashMap<NodeId, UnboundedSender<Datagram>>>>,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a node to the medium and returns its link. Joining again
    /// under the same identity replaces the previous attachment.
    pub fn join(&self, id: NodeId) -> MemoryLink {
        let (tx, rx) = mpsc::unbounded_channel();
        self.members
            .lock()
            .expect("bus lock poisoned")
            .insert(id, tx);

        MemoryLink {
            id,
            members: self.members.clone(),
            inbox: rx,
        }
    }
}

/// One node's attachment to a [`MemoryBus`].
pub struct MemoryLink {
    id: NodeId,
    members: Arc<Mutex<HashMap<NodeId, UnboundedSender<Datagram>>>>,
    inbox: UnboundedReceiver<Datagram>,
}

impl Link for MemoryLink {
    fn try_recv(&mut self) -> Option<Datagram> {
        self.inbox.try_recv().ok()
    }

    fn broadcast(&mut self, payload: &[u8]) -> Result<()> {
        let members = self.members.lock().expect("bus lock poisoned");

        for (id, tx) in members.iter() {
            if *id == self.id {
                continue;
            }
            // A dropped receiver is a departed node; the medium does not care.
            let _ = tx.send(Datagram {
                from: self.id,
                payload: payload.to_vec(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    fn id(last_octet: u8) -> NodeId {
        NodeId(IpAddr::V4(Ipv4Addr::new(10, 0, 0, last_octet)))
    }

    #[test]
    fn test_broadcast_reaches_all_other_members() {
        let bus = MemoryBus::new();
        let mut a = bus.join(id(1));
        let mut b = bus.join(id(2));
        let mut c = bus.join(id(3));

        a.broadcast(b"LIGHT:100").unwrap();

        let to_b = b.try_recv().expect("b should receive");
        assert_eq!(to_b.from, id(1));
        assert_eq!(to_b.payload, b"LIGHT:100");

        assert!(c.try_recv().is_some());
        // The medium never loops a broadcast back to its sender.
        assert!(a.try_recv().is_none());
    }

    #[test]
    fn test_try_recv_is_non_blocking() {
        let bus = MemoryBus::new();
        let mut a = bus.join(id(1));
        assert!(a.try_recv().is_none());
    }

    #[test]
    fn test_late_joiner_gets_no_history() {
        let bus = MemoryBus::new();
        let mut a = bus.join(id(1));
        let _ = a.broadcast(b"LIGHT:1");

        let mut b = bus.join(id(2));
        assert!(b.try_recv().is_none());
    }

    #[test]
    fn test_messages_drain_in_arrival_order() {
        let bus = MemoryBus::new();
        let mut a = bus.join(id(1));
        let mut b = bus.join(id(2));

        a.broadcast(b"LIGHT:1").unwrap();
        a.broadcast(b"LIGHT:2").unwrap();

        assert_eq!(b.try_recv().unwrap().payload, b"LIGHT:1");
        assert_eq!(b.try_recv().unwrap().payload, b"LIGHT:2");
        assert!(b.try_recv().is_none());
    }
}
