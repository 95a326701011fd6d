//! Envelope validation.

use crate::types::{JsonRpcRequest, McpError, McpResult, JSONRPC_VERSION};

/// Check that a request is structurally a JSON-RPC 2.0 request.
pub fn validate_request(request: &JsonRpcRequest) -> McpResult<()> {
    if request.jsonrpc != JSONRPC_VERSION {
        return Err(McpError::InvalidRequest(format!(
            "Expected jsonrpc version \"{JSONRPC_VERSION}\", got \"{}\"",
            request.jsonrpc
        )));
    }

    if request.method.is_empty() {
        return Err(McpError::InvalidRequest(
            "Method name must not be empty".to_string(),
        ));
    }

    Ok(())
}

/// Whether this request is the session-establishing handshake.
///
/// The decision is made on the method name, never inferred from the
/// presence or absence of a session header.
pub fn is_initialize(request: &JsonRpcRequest) -> bool {
    request.method == "initialize"
}
