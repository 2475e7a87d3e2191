use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::{routing::get, routing::post, Json, Router};
use light_swarm::membership::types::NodeId;
use light_swarm::protocol::{Message, MAX_DATAGRAM_LEN};
use serde::Serialize;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;

mod store;

use store::{DataPoint, MasterSummary, NodeState, TelemetryStore};

#[derive(Clone)]
struct AppState {
    store: Arc<TelemetryStore>,
    control: Arc<UdpSocket>,
    reset_target: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let bind_addr: SocketAddr = std::env::var("MONITOR_BIND")
        .unwrap_or_else(|_| "0.0.0.0:5000".to_string())
        .parse()?;
    let telemetry_port: u16 = std::env::var("TELEMETRY_PORT")
        .unwrap_or_else(|_| "4210".to_string())
        .parse()?;
    let broadcast_ip: IpAddr = std::env::var("BROADCAST_IP")
        .unwrap_or_else(|_| "255.255.255.255".to_string())
        .parse()?;

    let store = Arc::new(TelemetryStore::new());

    // Telemetry ingest: every datagram on the telemetry port, with sender
    // address and arrival time.
    let telemetry = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, telemetry_port)).await?;
    tracing::info!("Telemetry listener on port {}", telemetry_port);

    let ingest_store = Arc::clone(&store);
    tokio::spawn(async move {
        let mut buf = [0u8; MAX_DATAGRAM_LEN + 1];

        loop {
            match telemetry.recv_from(&mut buf).await {
                Ok((len, src)) => {
                    if let Some(message) = Message::parse(&buf[..len]) {
                        ingest_store.record(NodeId(src.ip()), message, Instant::now());
                    }
                }
                Err(e) => {
                    tracing::error!("telemetry receive failed: {}", e);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            }
        }
    });

    // Retention: drop readings that fall out of the display window.
    let prune_store = Arc::clone(&store);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));

        loop {
            interval.tick().await;
            prune_store.prune(Instant::now());
        }
    });

    // Control socket for broadcasting RESET back into the swarm.
    let control = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
    control.set_broadcast(true)?;

    let state = AppState {
        store,
        control: Arc::new(control),
        reset_target: SocketAddr::new(broadcast_ip, telemetry_port),
    };

    let app = Router::new()
        .route("/", get(ui))
        .route("/api/status", get(api_status))
        .route("/api/data", get(api_data))
        .route("/api/durations", get(api_durations))
        .route("/api/reset", post(api_reset))
        .with_state(state);

    tracing::info!("Monitor listening on {}", bind_addr);
    axum::serve(tokio::net::TcpListener::bind(bind_addr).await?, app).await?;

    Ok(())
}

async fn ui() -> Html<&'static str> {
    Html(include_str!("ui.html"))
}

#[derive(Serialize)]
struct StatusResponse {
    nodes: HashMap<String, NodeState>,
    current_master: Option<MasterSummary>,
}

async fn api_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let nodes = state
        .store
        .nodes_snapshot()
        .into_iter()
        .map(|(id, node)| (id.to_string(), node))
        .collect();

    Json(StatusResponse {
        nodes,
        current_master: state.store.current_master(),
    })
}

async fn api_data(State(state): State<AppState>) -> Json<Vec<DataPoint>> {
    Json(state.store.data_window())
}

async fn api_durations(State(state): State<AppState>) -> Json<HashMap<String, f64>> {
    let durations = state
        .store
        .durations_secs()
        .into_iter()
        .map(|(id, secs)| (id.to_string(), secs))
        .collect();

    Json(durations)
}

async fn api_reset(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let payload = Message::Reset.encode();

    state
        .control
        .send_to(payload.as_bytes(), state.reset_target)
        .await
        .map_err(|e| (StatusCode::BAD_GATEWAY, e.to_string()))?;

    // Every node drops back to bootstrap; start the observation over too.
    state.store.clear();
    tracing::info!("RESET broadcast to {}", state.reset_target);

    Ok(Json(serde_json::json!({ "status": "reset" })))
}
