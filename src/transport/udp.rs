use super::{Datagram, Link};
use crate::membership::types::NodeId;
use crate::protocol::MAX_DATAGRAM_LEN;
use anyhow::Result;
use std::io::ErrorKind;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tokio::net::UdpSocket;

/// One UDP broadcast channel: a socket bound to the channel's port, sending
/// to the subnet broadcast address on that same port.
pub struct UdpLink {
    socket: UdpSocket,
    broadcast_addr: SocketAddr,
}

impl UdpLink {
    /// Binds the channel's port on all interfaces and enables broadcast.
    pub async fn bind(port: u16, broadcast_ip: IpAddr) -> Result<Self> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, port)).await?;
        socket.set_broadcast(true)?;

        tracing::info!("udp channel bound on port {} (broadcast {})", port, broadcast_ip);

        Ok(Self {
            socket,
            broadcast_addr: SocketAddr::new(broadcast_ip, port),
        })
    }
}

impl Link for UdpLink {
    fn try_recv(&mut self) -> Option<Datagram> {
        // Oversized datagrams are invalid by protocol; one extra byte lets
        // the codec see "too long" instead of a silent truncation.
        let mut buf = [0u8; MAX_DATAGRAM_LEN + 1];

        match self.socket.try_recv_from(&mut buf) {
            Ok((len, src)) => Some(Datagram {
                from: NodeId(src.ip()),
                payload: buf[..len].to_vec(),
            }),
            Err(e) if e.kind() == ErrorKind::WouldBlock => None,
            Err(e) => {
                tracing::warn!("udp receive failed: {}", e);
                None
            }
        }
    }

    fn broadcast(&mut self, payload: &[u8]) -> Result<()> {
        match self.socket.try_send_to(payload, self.broadcast_addr) {
            Ok(_) => Ok(()),
            // A full send buffer is a dropped datagram, which the protocol
            // already tolerates; the next cadence resends.
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
