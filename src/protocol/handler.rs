//! Protocol dispatcher — classifies inbound envelopes and routes them to
//! the owning session and the tool registry.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::session::{NotificationStream, SessionId, SessionRegistry, SessionState};
use crate::tools::ToolRegistry;
use crate::types::*;

use super::negotiation;
use super::validator::{is_initialize, validate_request};

/// What the transport should do with a handled envelope.
#[derive(Debug)]
pub enum DispatchReply {
    /// JSON-RPC response or error body.
    Response(Value),
    /// Initialize succeeded: response body plus the freshly minted
    /// session id, which the transport surfaces to the client.
    NewSession { session_id: SessionId, body: Value },
    /// Notification accepted; no body.
    Accepted,
    /// Missing, unknown, or closed session id. The transport answers
    /// with a client-error status and this body. No session was created
    /// or mutated.
    Rejected(Value),
}

/// The single entry point the transport calls per inbound message.
///
/// Owns no global state: both registries are injected so tests can build
/// an isolated dispatcher.
pub struct Dispatcher {
    sessions: Arc<SessionRegistry>,
    tools: Arc<ToolRegistry>,
}

impl Dispatcher {
    pub fn new(sessions: Arc<SessionRegistry>, tools: Arc<ToolRegistry>) -> Self {
        Self { sessions, tools }
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.count().await
    }

    /// Handle one envelope. `session_id` is the transport-level session
    /// header, absent on the initialize handshake.
    pub async fn handle(&self, session_id: Option<&str>, msg: JsonRpcMessage) -> DispatchReply {
        match msg {
            JsonRpcMessage::Request(req) => self.handle_request(session_id, req).await,
            JsonRpcMessage::Notification(notif) => {
                self.handle_notification(session_id, notif).await
            }
            _ => {
                tracing::warn!("received unexpected message type from client");
                DispatchReply::Accepted
            }
        }
    }

    async fn handle_request(&self, session_id: Option<&str>, req: JsonRpcRequest) -> DispatchReply {
        if let Err(e) = validate_request(&req) {
            return DispatchReply::Response(error_body(&e, req.id));
        }

        if is_initialize(&req) {
            if session_id.is_some() {
                let e = McpError::InvalidRequest(
                    "initialize must not carry a session id".to_string(),
                );
                return DispatchReply::Response(error_body(&e, req.id));
            }
            return self.handle_initialize(req).await;
        }

        // Every other request kind must reference a live Active session.
        let session = match self.resolve_session(session_id).await {
            Ok(session) => session,
            Err(e) => return DispatchReply::Rejected(error_body(&e, req.id)),
        };

        let id = req.id.clone();
        let result = self.dispatch_request(&session, &req).await;

        match result {
            Ok(value) => DispatchReply::Response(response_body(id, value)),
            Err(e) => DispatchReply::Response(error_body(&e, id)),
        }
    }

    async fn handle_initialize(&self, req: JsonRpcRequest) -> DispatchReply {
        let params: InitializeParams = match req.parse_params() {
            Ok(params) => params,
            Err(e) => return DispatchReply::Response(error_body(&e, req.id)),
        };

        let result = negotiation::negotiate(&params);

        // Create returns with the session already recorded, then the
        // explicit mark-active step runs before the id is surfaced, so a
        // concurrent request for the new id can never observe a
        // half-registered session.
        let (session_id, session) = self.sessions.create().await;
        if let Err(e) = session.activate().await {
            return DispatchReply::Response(error_body(&e, req.id));
        }

        let body = match serde_json::to_value(result) {
            Ok(value) => response_body(req.id, value),
            Err(e) => {
                let e = McpError::InternalError(e.to_string());
                return DispatchReply::Response(error_body(&e, req.id));
            }
        };

        DispatchReply::NewSession { session_id, body }
    }

    async fn dispatch_request(
        &self,
        session: &Arc<crate::session::Session>,
        req: &JsonRpcRequest,
    ) -> McpResult<Value> {
        match req.method.as_str() {
            "ping" => Ok(Value::Object(serde_json::Map::new())),
            "tools/list" => self.handle_tools_list().await,
            "tools/call" => self.handle_tools_call(session, req).await,
            method => Err(McpError::MethodNotFound(method.to_string())),
        }
    }

    async fn handle_tools_list(&self) -> McpResult<Value> {
        let result = ToolListResult {
            tools: self.tools.list(),
            next_cursor: None,
        };
        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }

    async fn handle_tools_call(
        &self,
        session: &Arc<crate::session::Session>,
        req: &JsonRpcRequest,
    ) -> McpResult<Value> {
        let call_params: ToolCallParams = req.parse_params()?;

        // The registry lock is not held here: tool invocation runs only
        // against the already-resolved session.
        let result = self
            .tools
            .invoke(&call_params.name, call_params.arguments)
            .await?;

        session.push_notification(log_notification(
            LogLevel::Info,
            json!({ "tool": call_params.name, "event": "completed" }),
        ));

        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }

    async fn handle_notification(
        &self,
        session_id: Option<&str>,
        notif: JsonRpcNotification,
    ) -> DispatchReply {
        let session = match self.resolve_session(session_id).await {
            Ok(session) => session,
            Err(e) => return DispatchReply::Rejected(error_body(&e, RequestId::Null)),
        };

        match notif.method.as_str() {
            "notifications/initialized" => {
                tracing::info!(session = %session.id(), "handshake complete");
            }
            "notifications/cancelled" | "$/cancelRequest" => {
                tracing::info!(session = %session.id(), "received cancellation notification");
            }
            other => {
                tracing::debug!(session = %session.id(), "unknown notification: {other}");
            }
        }

        DispatchReply::Accepted
    }

    /// Map a session header to a live Active session.
    ///
    /// Never creates a session as a side effect: missing, unknown, and
    /// closed ids all come back as `SessionNotFound`.
    async fn resolve_session(
        &self,
        session_id: Option<&str>,
    ) -> McpResult<Arc<crate::session::Session>> {
        let id = SessionId::from(session_id.ok_or(McpError::SessionNotFound)?);
        let session = self.sessions.get(&id).await.ok_or(McpError::SessionNotFound)?;
        if session.state().await != SessionState::Active {
            return Err(McpError::SessionNotFound);
        }
        Ok(session)
    }

    /// Terminate a session: `Active → Closed`, removed from the registry,
    /// pending stream released.
    pub async fn terminate(&self, session_id: &str) -> McpResult<()> {
        let id = SessionId::from(session_id);
        let session = self.sessions.get(&id).await.ok_or(McpError::SessionNotFound)?;
        session.close().await;
        self.sessions.remove(&id).await;
        tracing::info!(session = %id, "session terminated");
        Ok(())
    }

    /// Open the session's server-to-client notification stream.
    pub async fn open_notification_stream(
        &self,
        session_id: &str,
    ) -> McpResult<NotificationStream> {
        let id = SessionId::from(session_id);
        let session = self.sessions.get(&id).await.ok_or(McpError::SessionNotFound)?;
        if session.state().await != SessionState::Active {
            return Err(McpError::SessionNotFound);
        }
        session.take_notification_stream()
    }

    /// Administrative shutdown: close every session.
    pub async fn shutdown(&self) {
        self.sessions.close_all().await;
    }
}

fn response_body(id: RequestId, result: Value) -> Value {
    serde_json::to_value(JsonRpcResponse::new(id, result)).unwrap_or_default()
}

fn error_body(error: &McpError, id: RequestId) -> Value {
    serde_json::to_value(error.to_json_rpc_error(id)).unwrap_or_default()
}
