//! Streamable HTTP transport — POST/GET/DELETE on /mcp plus /health.
//!
//! Session identity travels in the `Mcp-Session-Id` header both ways:
//! the initialize response carries the freshly generated id, and every
//! subsequent request echoes it.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json, Response,
    },
    routing::get,
    Router,
};
use futures::StreamExt;
use tower_http::cors::CorsLayer;

use crate::protocol::{DispatchReply, Dispatcher};
use crate::types::{McpError, McpResult, RequestId};

/// Header carrying the session id.
pub const SESSION_HEADER: &str = "mcp-session-id";

/// HTTP transport for streamable MCP clients.
pub struct HttpTransport {
    dispatcher: Arc<Dispatcher>,
}

impl HttpTransport {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route(
                "/mcp",
                axum::routing::post(handle_post)
                    .get(handle_get)
                    .delete(handle_delete),
            )
            .route("/health", get(handle_health))
            .layer(CorsLayer::permissive())
            .with_state(self.dispatcher.clone())
    }

    /// Run the HTTP server until ctrl-c, then close all sessions.
    pub async fn run(&self, addr: &str) -> McpResult<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;

        tracing::info!("HTTP transport listening on {addr}");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("shutdown signal received");
            })
            .await
            .map_err(|e| McpError::Transport(e.to_string()))?;

        self.dispatcher.shutdown().await;
        Ok(())
    }
}

fn session_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok())
}

fn error_response(status: StatusCode, error: &McpError) -> Response {
    (
        status,
        Json(
            serde_json::to_value(error.to_json_rpc_error(RequestId::Null)).unwrap_or_default(),
        ),
    )
        .into_response()
}

/// JSON-RPC over POST. Initialize creates a session; everything else is
/// routed to the session named by the header.
async fn handle_post(
    State(dispatcher): State<Arc<Dispatcher>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let msg = match serde_json::from_slice(&body) {
        Ok(msg) => msg,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, &McpError::ParseError(e.to_string()));
        }
    };

    match dispatcher.handle(session_header(&headers), msg).await {
        DispatchReply::Response(body) => (StatusCode::OK, Json(body)).into_response(),
        DispatchReply::NewSession { session_id, body } => (
            StatusCode::OK,
            [(SESSION_HEADER, session_id.to_string())],
            Json(body),
        )
            .into_response(),
        DispatchReply::Accepted => StatusCode::ACCEPTED.into_response(),
        DispatchReply::Rejected(body) => (StatusCode::BAD_REQUEST, Json(body)).into_response(),
    }
}

/// Server-to-client notification stream over SSE.
async fn handle_get(
    State(dispatcher): State<Arc<Dispatcher>>,
    headers: HeaderMap,
) -> Response {
    let Some(session_id) = session_header(&headers) else {
        return error_response(StatusCode::BAD_REQUEST, &McpError::SessionNotFound);
    };

    match dispatcher.open_notification_stream(session_id).await {
        Ok(stream) => {
            let events = stream.map(|notification| {
                Ok::<_, Infallible>(
                    Event::default()
                        .event("message")
                        .data(serde_json::to_string(&notification).unwrap_or_default()),
                )
            });
            Sse::new(events).keep_alive(KeepAlive::default()).into_response()
        }
        Err(e @ McpError::StreamBusy) => error_response(StatusCode::CONFLICT, &e),
        Err(e) => error_response(StatusCode::BAD_REQUEST, &e),
    }
}

/// Session termination.
async fn handle_delete(
    State(dispatcher): State<Arc<Dispatcher>>,
    headers: HeaderMap,
) -> Response {
    let Some(session_id) = session_header(&headers) else {
        return error_response(StatusCode::BAD_REQUEST, &McpError::SessionNotFound);
    };

    match dispatcher.terminate(session_id).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => error_response(StatusCode::BAD_REQUEST, &e),
    }
}

/// Health check — no session required.
async fn handle_health(State(dispatcher): State<Arc<Dispatcher>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": dispatcher.session_count().await,
    }))
}
