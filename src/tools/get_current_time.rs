//! Tool: getCurrentTime — current time, optionally in a given timezone.

use serde_json::{Map, Value};

use crate::time;
use crate::types::ToolCallResult;

use super::registry::{ParamKind, ParamSpec, ToolError, ToolSpec};

pub fn spec() -> ToolSpec {
    ToolSpec {
        name: "getCurrentTime",
        description: "Get the current time, optionally in a specific timezone",
        params: vec![ParamSpec {
            name: "timezone",
            kind: ParamKind::String,
            required: false,
            default: None,
            description: "IANA timezone name, e.g. \"Asia/Shanghai\"",
        }],
        handler: Box::new(|args| Box::pin(execute(args))),
    }
}

async fn execute(args: Map<String, Value>) -> Result<ToolCallResult, ToolError> {
    let timezone = args.get("timezone").and_then(Value::as_str);
    let text = time::current_time(timezone).map_err(|e| ToolError::new(e.to_string()))?;
    Ok(ToolCallResult::text(text))
}
