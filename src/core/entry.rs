//! Log entry structure

use super::fields::{FieldValue, Fields};
use super::level::LogLevel;
use serde::{Deserialize, Serialize};

/// One fully assembled log record.
///
/// Wire shape: `{ "level": "info", "message": "...", "time": 1736332245123,
/// ...flattened fields }`. `time` is epoch milliseconds and omitted when
/// unset. The entry is never mutated after being handed to the dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    #[serde(flatten)]
    pub fields: Fields,
}

impl LogEntry {
    /// Sanitize the message to prevent log injection attacks.
    ///
    /// Replaces newlines, carriage returns, and tabs with escape sequences
    /// so a crafted message cannot forge additional log lines.
    fn sanitize_message(message: &str) -> String {
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    pub fn new(level: LogLevel, message: String) -> Self {
        Self {
            level,
            message: Self::sanitize_message(&message),
            time: None,
            fields: Fields::new(),
        }
    }

    /// Attach merged fields. A numeric `time` field is lifted into the
    /// dedicated slot so enrichment sees the entry as already stamped.
    pub fn with_fields(mut self, mut fields: Fields) -> Self {
        if self.time.is_none() {
            let lifted = match fields.get("time") {
                Some(FieldValue::Int(ms)) => Some(*ms),
                Some(FieldValue::Float(ms)) => Some(*ms as i64),
                _ => None,
            };
            if let Some(ms) = lifted {
                self.time = Some(ms);
                fields.remove("time");
            }
        }
        self.fields = fields;
        self
    }

    pub fn with_time(mut self, epoch_millis: i64) -> Self {
        self.time = Some(epoch_millis);
        self
    }

    /// Serialize as a single-line JSON object
    pub fn to_json(&self) -> super::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
