//! Latency ping server
//!
//! A tiny standalone service for measuring round trips from the browser,
//! over plain HTTP (`/ping`) or a WebSocket (`/ws`).

use anyhow::Result;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::json;
use std::time::{Duration, Instant};
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::server::shutdown_signal;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone, Copy)]
struct PingState {
    started: Instant,
}

/// Reply to a ping
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PingResponse {
    pub server_time: DateTime<Local>,
    /// Unix milliseconds
    pub timestamp: i64,
    /// Nanoseconds since the server started
    pub uptime: u64,
}

impl PingResponse {
    fn since(started: Instant) -> Self {
        let now = Local::now();
        Self {
            server_time: now,
            timestamp: now.timestamp_millis(),
            uptime: u64::try_from(started.elapsed().as_nanos()).unwrap_or(u64::MAX),
        }
    }
}

pub fn router() -> Router {
    let state = PingState {
        started: Instant::now(),
    };

    Router::new()
        .route("/", get(hello))
        .route("/health", get(health))
        .route("/ping", get(ping))
        .route("/ws", get(websocket))
        .with_state(state)
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(CompressionLayer::new())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Run the ping server on `addr` until Ctrl+C
pub async fn start(addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("Ping server running at http://{}", listener.local_addr()?);

    axum::serve(listener, router())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn hello() -> Json<serde_json::Value> {
    Json(json!({ "message": "Hello, World!", "status": "ok" }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn ping(State(state): State<PingState>) -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, "no-cache")],
        Json(PingResponse::since(state.started)),
    )
}

async fn websocket(ws: WebSocketUpgrade, State(state): State<PingState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.started))
}

/// Answer every JSON object with a ping response until the client stops
async fn handle_socket(mut socket: WebSocket, started: Instant) {
    tracing::debug!("WebSocket client connected");

    while let Some(msg) = socket.recv().await {
        let reply = match msg {
            Ok(Message::Text(text)) => reply_to(text.as_bytes(), started),
            Ok(Message::Binary(data)) => reply_to(&data, started),
            Ok(Message::Ping(data)) => {
                if socket.send(Message::Pong(data)).await.is_err() {
                    break;
                }
                continue;
            }
            Ok(Message::Pong(_)) => continue,
            Ok(Message::Close(_)) => break,
            Err(e) => {
                tracing::debug!("WebSocket error: {}", e);
                break;
            }
        };

        let Some(reply) = reply else {
            tracing::debug!("Ignoring non-JSON message, closing");
            break;
        };
        if socket.send(Message::Text(reply)).await.is_err() {
            break;
        }
    }

    tracing::debug!("WebSocket client disconnected");
}

/// Serialized ping response if `message` is a JSON object
fn reply_to(message: &[u8], started: Instant) -> Option<String> {
    serde_json::from_slice::<serde_json::Map<String, serde_json::Value>>(message).ok()?;
    serde_json::to_string(&PingResponse::since(started)).ok()
}
