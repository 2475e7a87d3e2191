//! Membership Module Tests
//!
//! Validates the peer table against the protocol's membership rules.
//!
//! ## Test Scopes
//! - **Identity**: total ordering of node identities used for tie-breaks.
//! - **Upsert**: insertion, idempotent refresh, value overwrite.
//! - **Bounds**: the fixed 10-entry capacity and refusal policy.
//! - **Eviction**: timeout-based removal and capacity reclamation.

#[cfg(test)]
mod tests {
    use crate::membership::table::{PeerTable, DEVICE_TIMEOUT, MAX_PEERS};
    use crate::membership::types::NodeId;
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::{Duration, Instant};

    fn id(last_octet: u8) -> NodeId {
        NodeId(IpAddr::V4(Ipv4Addr::new(192, 168, 1, last_octet)))
    }

    // ============================================================
    // NODE ID TESTS
    // ============================================================

    #[test]
    fn test_node_id_total_order() {
        assert!(id(1) < id(2));
        assert!(id(2) < id(200));
        assert_eq!(id(7), id(7));

        // Octet-lexicographic, not string-lexicographic: .9 < .10
        assert!(id(9) < id(10));
    }

    #[test]
    fn test_node_id_display() {
        assert_eq!(id(35).to_string(), "192.168.1.35");
    }

    // ============================================================
    // UPSERT TESTS
    // ============================================================

    #[test]
    fn test_upsert_inserts_new_peer() {
        let mut table = PeerTable::new();
        let now = Instant::now();

        assert!(table.upsert(id(1), 500, now));
        assert_eq!(table.len(), 1);

        let peer = table.get(&id(1)).expect("peer should be present");
        assert_eq!(peer.value, 500);
        assert_eq!(peer.last_seen, now);
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let mut table = PeerTable::new();
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_millis(100);

        table.upsert(id(1), 500, t0);
        table.upsert(id(1), 500, t1);

        // Same (identity, value) twice: size unchanged, timestamp refreshed.
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&id(1)).unwrap().last_seen, t1);
    }

    #[test]
    fn test_upsert_overwrites_value() {
        let mut table = PeerTable::new();
        let now = Instant::now();

        table.upsert(id(1), 500, now);
        table.upsert(id(1), 600, now + Duration::from_millis(50));

        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&id(1)).unwrap().value, 600);
    }

    // ============================================================
    // CAPACITY TESTS
    // ============================================================

    #[test]
    fn test_capacity_refuses_eleventh_peer() {
        let mut table = PeerTable::new();
        let now = Instant::now();

        for octet in 1..=MAX_PEERS as u8 {
            assert!(table.upsert(id(octet), octet as i32, now));
        }
        assert_eq!(table.len(), MAX_PEERS);

        // The 11th distinct identity is silently refused.
        assert!(!table.upsert(id(11), 999, now));
        assert_eq!(table.len(), MAX_PEERS);
        assert!(!table.contains(&id(11)));
    }

    #[test]
    fn test_capacity_still_refreshes_known_peers() {
        let mut table = PeerTable::new();
        let now = Instant::now();

        for octet in 1..=MAX_PEERS as u8 {
            table.upsert(id(octet), 0, now);
        }

        // A full table keeps accepting updates for identities it knows.
        assert!(table.upsert(id(3), 777, now + Duration::from_millis(10)));
        assert_eq!(table.get(&id(3)).unwrap().value, 777);
    }

    #[test]
    fn test_eviction_frees_capacity() {
        let mut table = PeerTable::new();
        let t0 = Instant::now();

        for octet in 1..=MAX_PEERS as u8 {
            table.upsert(id(octet), 0, t0);
        }

        // Keep one peer fresh, let the rest expire.
        let later = t0 + DEVICE_TIMEOUT + Duration::from_millis(1);
        table.upsert(id(1), 5, later);
        assert_eq!(table.evict_stale(later), MAX_PEERS - 1);

        assert!(table.upsert(id(11), 42, later));
        assert!(table.contains(&id(11)));
    }

    // ============================================================
    // EVICTION TESTS
    // ============================================================

    #[test]
    fn test_evict_stale_removes_only_expired() {
        let mut table = PeerTable::new();
        let t0 = Instant::now();

        table.upsert(id(1), 100, t0);
        table.upsert(id(2), 200, t0 + Duration::from_millis(3000));

        let now = t0 + DEVICE_TIMEOUT + Duration::from_millis(1);
        let removed = table.evict_stale(now);

        assert_eq!(removed, 1);
        assert!(!table.contains(&id(1)));
        assert!(table.contains(&id(2)));
    }

    #[test]
    fn test_evict_at_exact_timeout_keeps_peer() {
        let mut table = PeerTable::new();
        let t0 = Instant::now();

        table.upsert(id(1), 100, t0);

        // Eviction fires strictly after DEVICE_TIMEOUT, not at it.
        assert_eq!(table.evict_stale(t0 + DEVICE_TIMEOUT), 0);
        assert!(table.contains(&id(1)));
    }

    #[test]
    fn test_clear_empties_table() {
        let mut table = PeerTable::new();
        let now = Instant::now();

        table.upsert(id(1), 100, now);
        table.upsert(id(2), 200, now);
        table.clear();

        assert!(table.is_empty());
        assert_eq!(table.iter().count(), 0);
    }
}
