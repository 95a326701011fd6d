//! Error taxonomy and JSON-RPC error codes.

use super::message::{JsonRpcError, JsonRpcErrorObject, RequestId, JSONRPC_VERSION};

/// Standard JSON-RPC 2.0 error codes.
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// Server-defined error codes (JSON-RPC reserves -32000..-32099).
pub mod server_error_codes {
    /// Missing, unknown, or closed session id.
    pub const SESSION_NOT_FOUND: i32 = -32000;
    /// Tool name not registered.
    pub const TOOL_NOT_FOUND: i32 = -32001;
    /// Session already has an open notification stream.
    pub const STREAM_BUSY: i32 = -32002;
}

/// All errors the server can surface.
///
/// Everything here is recovered at the dispatcher or transport boundary
/// and turned into a structured JSON-RPC error response. Handler-level
/// tool failures never appear as an `McpError`: the tool registry reports
/// them as an `isError` tool result so the session stays usable.
#[derive(thiserror::Error, Debug)]
pub enum McpError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Invalid or missing session id")]
    SessionNotFound,

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Registration-time only. Fatal at startup, never at request time.
    #[error("Duplicate tool registration: {0}")]
    DuplicateTool(String),

    #[error("Notification stream already open for this session")]
    StreamBusy,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl McpError {
    pub fn code(&self) -> i32 {
        use error_codes::*;
        use server_error_codes::*;
        match self {
            McpError::ParseError(_) => PARSE_ERROR,
            McpError::InvalidRequest(_) => INVALID_REQUEST,
            McpError::MethodNotFound(_) => METHOD_NOT_FOUND,
            McpError::InvalidParams(_) => INVALID_PARAMS,
            McpError::InternalError(_) => INTERNAL_ERROR,
            McpError::SessionNotFound => SESSION_NOT_FOUND,
            McpError::ToolNotFound(_) => TOOL_NOT_FOUND,
            McpError::StreamBusy => STREAM_BUSY,
            McpError::DuplicateTool(_) => INTERNAL_ERROR,
            McpError::Transport(_) | McpError::Io(_) => INTERNAL_ERROR,
        }
    }

    pub fn to_json_rpc_error(&self, id: RequestId) -> JsonRpcError {
        JsonRpcError {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            error: JsonRpcErrorObject {
                code: self.code(),
                message: self.to_string(),
                data: None,
            },
        }
    }
}

pub type McpResult<T> = Result<T, McpError>;
