//! Thin HTTP/WebSocket adapter over the assistant core. Translates JSON
//! bodies and WS frames into core calls and nothing more — identity and
//! storage live in other services.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::orchestrator::Assistant;
use crate::types::{ConversationContext, TurnReply};

#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<Assistant>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub context: ConversationContext,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(|| async { StatusCode::OK }))
        .route("/api/assistant/chat", post(chat_handler))
        .route("/api/assistant/stream", get(stream_handler))
        .with_state(state)
}

async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Json<TurnReply> {
    let reply = state
        .assistant
        .process_message(&request.message, &request.context)
        .await;
    Json(reply)
}

async fn stream_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| stream_session(socket, state))
}

/// One streaming exchange per socket: the first text frame is the patient's
/// message, every token (sentinels included) goes back as a text frame.
async fn stream_session(mut socket: WebSocket, state: AppState) {
    let message = loop {
        match socket.recv().await {
            Some(Ok(WsMessage::Text(text))) => break text,
            Some(Ok(WsMessage::Close(_))) | None => return,
            Some(Ok(_)) => continue,
            Some(Err(err)) => {
                warn!(error = %err, "WebSocket receive failed");
                return;
            }
        }
    };

    let (tx, mut rx) = mpsc::channel::<String>(32);
    let assistant = Arc::clone(&state.assistant);
    let session = tokio::spawn(async move { assistant.stream_message(&message, tx).await });

    while let Some(token) = rx.recv().await {
        if socket.send(WsMessage::Text(token)).await.is_err() {
            // Client went away; the stream task sees the closed channel.
            break;
        }
    }

    match session.await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => warn!(error = %err, "Streaming session failed"),
        Err(err) => warn!(error = %err, "Streaming task panicked"),
    }
    let _ = socket.close().await;
}

pub async fn serve(state: AppState, bind: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(addr = %bind, "Assistant transport listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
