//! Capability negotiation during the initialize handshake.

use crate::types::{InitializeParams, InitializeResult, MCP_VERSION};

/// Negotiate against the client's advertised capabilities.
///
/// Version skew is tolerated: the server answers with the version it
/// speaks and lets the client decide whether to proceed.
pub fn negotiate(params: &InitializeParams) -> InitializeResult {
    if params.protocol_version != MCP_VERSION {
        tracing::warn!(
            "Client requested protocol version {}, server supports {}. Proceeding with server version.",
            params.protocol_version,
            MCP_VERSION
        );
    }

    tracing::info!(
        "Initialized with client: {} v{}",
        params.client_info.name,
        params.client_info.version
    );

    InitializeResult::default_result()
}
