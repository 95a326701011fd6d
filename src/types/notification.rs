//! Server-initiated notification payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::message::JsonRpcNotification;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogMessageParams {
    pub level: LogLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logger: Option<String>,
    pub data: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// Build a `notifications/message` log notification.
pub fn log_notification(level: LogLevel, data: Value) -> JsonRpcNotification {
    let params = LogMessageParams {
        level,
        logger: Some(super::capabilities::SERVER_NAME.to_string()),
        data,
    };
    JsonRpcNotification::new(
        "notifications/message",
        serde_json::to_value(params).ok(),
    )
}
