//! Tool: convertTimezone — convert a datetime between timezones.

use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::time;
use crate::types::ToolCallResult;

use super::registry::{ParamKind, ParamSpec, ToolError, ToolSpec};

#[derive(Debug, Deserialize)]
struct Params {
    #[serde(default)]
    datetime: Option<String>,
    #[serde(rename = "sourceTimezone")]
    source_timezone: String,
    #[serde(rename = "targetTimezone")]
    target_timezone: String,
}

pub fn spec() -> ToolSpec {
    ToolSpec {
        name: "convertTimezone",
        description: "Convert a datetime between timezones",
        params: vec![
            ParamSpec {
                name: "datetime",
                kind: ParamKind::String,
                required: false,
                default: None,
                description: "ISO 8601 datetime; the current time when omitted",
            },
            ParamSpec {
                name: "sourceTimezone",
                kind: ParamKind::String,
                required: false,
                default: Some(json!("UTC")),
                description: "Source timezone",
            },
            ParamSpec {
                name: "targetTimezone",
                kind: ParamKind::String,
                required: false,
                default: Some(json!("UTC")),
                description: "Target timezone",
            },
        ],
        handler: Box::new(|args| Box::pin(execute(args))),
    }
}

async fn execute(args: Map<String, Value>) -> Result<ToolCallResult, ToolError> {
    let params: Params = serde_json::from_value(Value::Object(args))
        .map_err(|e| ToolError::new(e.to_string()))?;

    let text = time::convert(
        params.datetime.as_deref(),
        &params.source_timezone,
        &params.target_timezone,
        Utc::now(),
    )
    .map_err(|e| ToolError::new(e.to_string()))?;

    Ok(ToolCallResult::text(text))
}
