use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::time::Instant;

/// Identity of a node in the swarm: its network address.
///
/// This is the one total order used everywhere a tie-break occurs: the
/// derived `Ord` of [`IpAddr`], which compares IPv4 addresses
/// octet-lexicographically (and orders every IPv4 address before any IPv6
/// address). Two nodes comparing the same pair of identities always agree
/// on which is smaller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub IpAddr);

impl NodeId {
    pub fn new(addr: IpAddr) -> Self {
        Self(addr)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<IpAddr> for NodeId {
    fn from(addr: IpAddr) -> Self {
        Self(addr)
    }
}

/// A peer known via received broadcast.
#[derive(Debug, Clone)]
pub struct Peer {
    pub id: NodeId,
    /// Last reading the peer reported, regardless of its role at the time.
    pub value: i32,
    pub last_seen: Instant,
}
