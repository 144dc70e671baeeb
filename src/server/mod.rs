//! WebSocket transport and HTTP surface.
//!
//! One route accepts WebSocket upgrades and binds each accepted socket to a
//! fresh [`Session`]. Inference runs on the blocking pool so a slow model
//! stalls only its own connection, never the accept loop.

pub mod health;

use crate::config::Config;
use crate::error::{Result, StreamscribeError};
use crate::protocol::ServerEvent;
use crate::session::{Session, SessionConfig};
use crate::stt::Transcriber;
use axum::{
    Router,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
    routing::get,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// Shared state handed to every connection handler.
#[derive(Clone)]
pub struct ServerState {
    pub transcriber: Arc<dyn Transcriber>,
    pub config: Arc<Config>,
}

/// One inbound frame, in arrival order.
enum SessionInput {
    Audio(Vec<u8>),
    Text(String),
}

/// Builds the application router for the given state.
pub fn router(state: ServerState) -> Router {
    let mut app = Router::new().route("/", get(ws_handler));

    if state.config.server.enable_health {
        app = app.merge(health::routes());
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Binds the configured address and serves until the process is stopped.
pub async fn serve(config: Config, transcriber: Arc<dyn Transcriber>) -> Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| StreamscribeError::Startup {
            message: format!("failed to bind {}: {}", addr, e),
        })?;

    info!(%addr, model = transcriber.model_name(), "listening");

    let state = ServerState {
        transcriber,
        config: Arc::new(config),
    };
    serve_with_listener(listener, state).await
}

/// Serves on an already-bound listener. Split out so tests can bind port 0.
pub async fn serve_with_listener(listener: TcpListener, state: ServerState) -> Result<()> {
    axum::serve(listener, router(state))
        .await
        .map_err(|e| StreamscribeError::Transport {
            message: e.to_string(),
        })?;
    Ok(())
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<ServerState>) -> Response {
    let max = state.config.server.max_message_bytes;
    ws.max_message_size(max)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

/// Drives one connection: reads frames in order, feeds them to the session on
/// the blocking pool, and writes resulting events back.
async fn handle_socket(socket: WebSocket, state: ServerState) {
    let session_id = uuid::Uuid::new_v4().to_string()[..8].to_string();
    info!(session = %session_id, "client connected");

    let (mut ws_tx, mut ws_rx) = socket.split();
    let (out_tx, mut out_rx) = mpsc::channel::<ServerEvent>(64);
    let (in_tx, in_rx) = mpsc::channel::<SessionInput>(64);

    if out_tx.send(Session::greeting()).await.is_err() {
        return;
    }

    // Writer task: serializes events onto the socket.
    let writer_id = session_id.clone();
    let writer = tokio::spawn(async move {
        while let Some(event) = out_rx.recv().await {
            let json = match event.to_json() {
                Ok(json) => json,
                Err(e) => {
                    warn!(session = %writer_id, error = %e, "event serialization failed");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    // Session task: owns all per-connection state, runs inference on the
    // blocking pool.
    let session = Session::new(
        session_id.clone(),
        state.transcriber.clone(),
        SessionConfig::from(state.config.as_ref()),
    );
    let session_out = out_tx.clone();
    let session_task = tokio::task::spawn_blocking(move || {
        session_loop(session, in_rx, session_out);
    });

    while let Some(frame) = ws_rx.next().await {
        let input = match frame {
            Ok(Message::Binary(bytes)) => SessionInput::Audio(bytes),
            Ok(Message::Text(text)) => SessionInput::Text(text),
            Ok(Message::Close(_)) => break,
            Ok(_) => continue, // ping/pong handled by axum
            Err(e) => {
                warn!(session = %session_id, error = %e, "transport error");
                let _ = out_tx
                    .send(ServerEvent::Error {
                        message: e.to_string(),
                    })
                    .await;
                break;
            }
        };
        if in_tx.send(input).await.is_err() {
            break;
        }
    }

    // Dropping the input sender ends the session loop; dropping our event
    // sender lets the writer drain and exit.
    drop(in_tx);
    drop(out_tx);
    let _ = session_task.await;
    let _ = writer.await;

    info!(session = %session_id, "client disconnected");
}

/// Processes frames strictly in arrival order until the channel closes.
fn session_loop(
    mut session: Session,
    mut in_rx: mpsc::Receiver<SessionInput>,
    out_tx: mpsc::Sender<ServerEvent>,
) {
    while let Some(input) = in_rx.blocking_recv() {
        let event = match input {
            SessionInput::Audio(bytes) => session.on_audio(&bytes, Instant::now()),
            SessionInput::Text(text) => session.on_text(&text),
        };
        if let Some(event) = event
            && out_tx.blocking_send(event).is_err()
        {
            break;
        }
    }
    session.on_close();
    debug!(session = %session.id(), "session closed");
}
