//! Election Module
//!
//! Computes which node currently leads the swarm and tracks the local node's
//! role as that computation evolves.
//!
//! ## Core Mechanisms
//! - **Deterministic computation**: [`compute_leader`](engine::compute_leader)
//!   is a pure function over the local reading plus the peer table, so any
//!   two nodes observing the same snapshot elect the same leader. That is
//!   the entire basis for swarm-wide agreement.
//! - **Role state machine**: `Bootstrap -> Follower | Master` on the first
//!   computation, `Follower <-> Master` on later ones, anything `-> Bootstrap`
//!   on a reset command.
//! - **Master liveness**: a follower that stops hearing from its believed
//!   leader forces a re-election after a timeout.

pub mod engine;
