use axum::extract::Extension;
use axum::routing::get;
use axum::Router;
use light_swarm::membership::types::NodeId;
use light_swarm::node::config::NodeConfig;
use light_swarm::node::handlers::{handle_peers, handle_status};
use light_swarm::node::runner::{self, Sensor, SharedNode};
use light_swarm::node::scheduler::SwarmNode;
use light_swarm::transport::udp::UdpLink;
use rand::Rng;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: {} --id <ip> [options]", args[0]);
        eprintln!("Options:");
        eprintln!("  --id <ip>              this node's identity (its own address)");
        eprintln!("  --coord-port <port>    coordination broadcast port (default 4211)");
        eprintln!("  --telemetry-port <p>   telemetry broadcast port (default 4210)");
        eprintln!("  --broadcast <ip>       subnet broadcast address (default 255.255.255.255)");
        eprintln!("  --http-port <port>     status API port (default 5211)");
        eprintln!("Example: {} --id 192.168.1.35 --broadcast 192.168.1.255", args[0]);
        std::process::exit(1);
    }

    let mut node_id: Option<IpAddr> = None;
    let mut config = NodeConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--id" => {
                node_id = Some(args[i + 1].parse()?);
                i += 2;
            }
            "--coord-port" => {
                config.coordination_port = args[i + 1].parse()?;
                i += 2;
            }
            "--telemetry-port" => {
                config.telemetry_port = args[i + 1].parse()?;
                i += 2;
            }
            "--broadcast" => {
                config.broadcast_ip = args[i + 1].parse()?;
                i += 2;
            }
            "--http-port" => {
                config.http_port = args[i + 1].parse()?;
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }

    let node_id = NodeId(node_id.expect("--id is required"));

    tracing::info!("Starting swarm node {}", node_id);
    tracing::info!(
        "Channels: coordination :{} / telemetry :{} (broadcast {})",
        config.coordination_port,
        config.telemetry_port,
        config.broadcast_ip
    );

    // 1. Broadcast channels:
    let coordination = UdpLink::bind(config.coordination_port, config.broadcast_ip).await?;
    let telemetry = UdpLink::bind(config.telemetry_port, config.broadcast_ip).await?;

    // 2. Node state:
    let node: SharedNode = Arc::new(RwLock::new(SwarmNode::new(node_id, Instant::now())));

    // 3. Scheduler loop (the sensed value itself is out of scope here; a
    //    random-walk source stands in for the analog input):
    let scheduler_node = Arc::clone(&node);
    tokio::spawn(async move {
        runner::run(scheduler_node, coordination, telemetry, SimulatedSensor::new()).await;
    });

    // 4. Stats reporter:
    let stats_node = Arc::clone(&node);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(5));

        loop {
            interval.tick().await;
            let node = stats_node.read().await;
            tracing::info!(
                "Swarm view: role={:?} leader={} value={} peers={}",
                node.role(),
                node.leader().map(|l| l.to_string()).unwrap_or_else(|| "-".into()),
                node.value(),
                node.peer_count()
            );
        }
    });

    // 5. HTTP status surface:
    let app = Router::new()
        .route("/status", get(handle_status))
        .route("/peers", get(handle_peers))
        .layer(Extension(node));

    let http_addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    tracing::info!("Status API listening on {}", http_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(http_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Random-walk stand-in for the light sensor, bounded to the 12-bit range
/// the real ADC produces.
struct SimulatedSensor {
    value: i32,
}

impl SimulatedSensor {
    fn new() -> Self {
        Self {
            value: rand::thread_rng().gen_range(0..4096),
        }
    }
}

impl Sensor for SimulatedSensor {
    fn read(&mut self) -> i32 {
        let step = rand::thread_rng().gen_range(-25..=25);
        self.value = (self.value + step).clamp(0, 4095);
        self.value
    }
}
