//! WebSocket advice sessions
//!
//! Each connection runs its own receive/evaluate/send loop. Inbound text
//! frames carry a JSON profile, outbound frames carry `{"advice": ...}`.
//! Nothing is remembered between messages.
//!
//! The loop ends when the peer closes, the transport fails, a message cannot
//! be decoded (answered with close code 1007), or the server shuts down
//! (close code 1001). Malformed messages are never skipped or retried.

use crate::server::AppState;
use axum::{
    extract::{
        ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use finadvisor_common::{evaluate, AdviceResponse, FinancialProfile, ProfileError};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Close frame reasons are limited to 123 bytes on the wire
const MAX_CLOSE_REASON: usize = 123;

/// Reasons a single inbound message is refused
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid profile message: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    InvalidProfile(#[from] ProfileError),

    #[error("unsupported {0} frame, expected JSON text")]
    UnsupportedFrame(&'static str),
}

/// Why a session loop ended
#[derive(Debug)]
pub enum SessionEnd {
    ClientClosed,
    Rejected(SessionError),
    Transport(String),
    Shutdown,
}

/// Axum handler for WebSocket upgrade
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let shutdown = state.shutdown.clone();
    let live = state.sessions.clone();
    ws.on_upgrade(move |socket| async move {
        run_session(socket, shutdown).await;
        drop(live);
    })
}

/// Decode, validate and evaluate one text message
pub fn handle_text(text: &str) -> Result<AdviceResponse, SessionError> {
    let profile: FinancialProfile = serde_json::from_str(text)?;
    profile.validate()?;
    Ok(evaluate(&profile).into())
}

/// Drive one connection until it closes
pub async fn run_session(socket: WebSocket, mut shutdown: watch::Receiver<bool>) -> SessionEnd {
    let session_id = Uuid::new_v4();
    info!(%session_id, "Session opened");

    let (mut sender, mut receiver) = socket.split();

    let end = loop {
        tokio::select! {
            _ = shutdown_requested(&mut shutdown) => {
                let _ = sender
                    .send(close_message(close_code::AWAY, "server shutting down"))
                    .await;
                break SessionEnd::Shutdown;
            }

            incoming = receiver.next() => {
                let text = match incoming {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Binary(_))) => {
                        let err = SessionError::UnsupportedFrame("binary");
                        let _ = sender.send(rejection(&err)).await;
                        break SessionEnd::Rejected(err);
                    }
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                    Some(Ok(Message::Close(_))) | None => break SessionEnd::ClientClosed,
                    Some(Err(e)) => break SessionEnd::Transport(e.to_string()),
                };

                match handle_text(&text) {
                    Ok(reply) => {
                        debug!(%session_id, advice = %reply.advice, "Advice evaluated");
                        let json = match serde_json::to_string(&reply) {
                            Ok(json) => json,
                            Err(e) => break SessionEnd::Transport(e.to_string()),
                        };
                        if let Err(e) = sender.send(Message::Text(json)).await {
                            break SessionEnd::Transport(e.to_string());
                        }
                    }
                    Err(err) => {
                        warn!(%session_id, "Rejected session message: {}", err);
                        let _ = sender.send(rejection(&err)).await;
                        break SessionEnd::Rejected(err);
                    }
                }
            }
        }
    };

    info!(%session_id, ?end, "Session closed");
    end
}

/// Resolves once the server signals shutdown. A dropped sender never
/// signals, so the session keeps running until the peer leaves.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stopping| *stopping).await.is_err() {
        std::future::pending::<()>().await;
    }
}

fn rejection(err: &SessionError) -> Message {
    close_message(close_code::INVALID, &err.to_string())
}

fn close_message(code: u16, reason: &str) -> Message {
    Message::Close(Some(CloseFrame {
        code,
        reason: truncate_reason(reason).into(),
    }))
}

fn truncate_reason(reason: &str) -> String {
    if reason.len() <= MAX_CLOSE_REASON {
        return reason.to_string();
    }
    let mut end = MAX_CLOSE_REASON;
    while !reason.is_char_boundary(end) {
        end -= 1;
    }
    reason[..end].to_string()
}
