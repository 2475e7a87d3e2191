//! HTTP Status Surface
//!
//! Read-only JSON snapshots of one node's view of the swarm, for inspection
//! while the protocol runs underneath.

use super::runner::SharedNode;
use crate::election::engine::Role;
use crate::membership::types::NodeId;
use axum::extract::Extension;
use axum::Json;
use serde::Serialize;
use std::time::Instant;

#[derive(Debug, Serialize)]
pub struct PeerSnapshot {
    pub id: NodeId,
    pub value: i32,
    /// Milliseconds since this peer was last heard from.
    pub age_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub id: NodeId,
    pub value: i32,
    pub role: Role,
    pub leader: Option<NodeId>,
    pub is_master: bool,
    pub peer_count: usize,
}

pub async fn handle_status(Extension(node): Extension<SharedNode>) -> Json<StatusResponse> {
    let node = node.read().await;

    Json(StatusResponse {
        id: node.id(),
        value: node.value(),
        role: node.role(),
        leader: node.leader(),
        is_master: node.is_master(),
        peer_count: node.peer_count(),
    })
}

pub async fn handle_peers(Extension(node): Extension<SharedNode>) -> Json<Vec<PeerSnapshot>> {
    let node = node.read().await;
    let now = Instant::now();

    let peers = node
        .peers()
        .map(|peer| PeerSnapshot {
            id: peer.id,
            value: peer.value,
            age_ms: now.saturating_duration_since(peer.last_seen).as_millis() as u64,
        })
        .collect();

    Json(peers)
}
