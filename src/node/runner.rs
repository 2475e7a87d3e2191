use super::scheduler::{SwarmNode, TICK_INTERVAL};
use crate::transport::Link;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// Shared handle on a node's state: the scheduler task writes, the HTTP
/// status handlers and the stats reporter read.
pub type SharedNode = Arc<RwLock<SwarmNode>>;

/// Source of the locally sensed value. The real analog input lives outside
/// this crate; deployments wire their own implementation and the binary
/// ships a simulated one.
pub trait Sensor: Send {
    /// Current reading. Called once per tick and must not block.
    fn read(&mut self) -> i32;
}

impl<F> Sensor for F
where
    F: FnMut() -> i32 + Send,
{
    fn read(&mut self) -> i32 {
        self()
    }
}

/// Drives one node forever: a fixed-interval ticker, one scheduler pass per
/// tick. The write lock is held only for the duration of the pass, which
/// never awaits.
pub async fn run(
    node: SharedNode,
    mut coordination: impl Link,
    mut telemetry: impl Link,
    mut sensor: impl Sensor,
) {
    let mut ticker = tokio::time::interval(TICK_INTERVAL);

    loop {
        ticker.tick().await;
        let value = sensor.read();

        let mut node = node.write().await;
        node.tick(Instant::now(), value, &mut coordination, &mut telemetry);
    }
}
