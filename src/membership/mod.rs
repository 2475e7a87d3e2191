//! Peer Membership Module
//!
//! Tracks the set of peers known via received broadcasts. Each peer carries
//! its last reported reading and the time it was last heard from; entries
//! that stay silent longer than [`DEVICE_TIMEOUT`](table::DEVICE_TIMEOUT)
//! are evicted and immediately stop influencing the election.
//!
//! ## Core Mechanisms
//! - **Upsert-on-receipt**: every inbound reading or announcement refreshes
//!   the sender's entry; duplicates are idempotent overwrites.
//! - **Bounded capacity**: the table holds at most
//!   [`MAX_PEERS`](table::MAX_PEERS) entries; further identities are silently
//!   refused until eviction frees a slot (a documented scaling limit).
//! - **Single ownership**: the table belongs to one node's scheduler loop,
//!   so it needs no locking.

pub mod table;
pub mod types;

#[cfg(test)]
mod tests;
