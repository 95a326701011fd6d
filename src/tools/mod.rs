//! Tool registry and the time tools.

pub mod convert_timezone;
pub mod get_current_time;
pub mod registry;

pub use registry::{ParamKind, ParamSpec, ToolError, ToolRegistry, ToolSpec};

use crate::types::McpResult;

/// Build the registry with the standard time tools.
pub fn default_registry() -> McpResult<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    registry.register(get_current_time::spec())?;
    registry.register(convert_timezone::spec())?;
    Ok(registry)
}
