//! Tempus MCP server — current time and timezone conversion over a
//! session-oriented streamable HTTP transport.

pub mod config;
pub mod protocol;
pub mod session;
pub mod time;
pub mod tools;
pub mod transport;
pub mod types;

pub use config::resolve_bind_addr;
pub use protocol::{DispatchReply, Dispatcher};
pub use session::{SessionId, SessionRegistry};
pub use tools::{default_registry, ToolRegistry};
pub use transport::HttpTransport;
