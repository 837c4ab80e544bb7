//! Structured log formatter activity
//!
//! Takes a `logObject` map from the flow and emits it through the host's
//! logger, either as a single JSON line or as a sorted `key="value"` line
//! with the `message` field pulled to the front.

use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use super::{Activity, ActivityContext};
use crate::error::{Result, TranscodeError};

const IV_LOG_OBJECT: &str = "logObject";

/// Static settings supplied by the host at registration time
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LogSettings {
    pub log_level: String,
    pub log_as_json: bool,
    pub include_flow_info: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        LogSettings {
            log_level: "INFO".to_string(),
            log_as_json: false,
            include_flow_info: true,
        }
    }
}

/// The dynamic log activity
#[derive(Debug, Default)]
pub struct DynamicLog {
    settings: LogSettings,
}

impl DynamicLog {
    pub fn new(settings: LogSettings) -> Self {
        DynamicLog { settings }
    }

    /// Build an instance from the host's settings map.
    pub fn from_settings(settings: &Value) -> Result<Self> {
        let settings = LogSettings::deserialize(settings)
            .map_err(|err| TranscodeError::InvalidInput(err.to_string()))?;
        Ok(DynamicLog::new(settings))
    }

    fn render(&self, log_object: Map<String, Value>) -> Result<String> {
        let mut entry = Map::new();
        if self.settings.include_flow_info {
            self.add_standard_fields(&mut entry);
        }
        entry.extend(log_object);

        if self.settings.log_as_json {
            if !entry.contains_key("@timestamp") {
                entry.insert("@timestamp".to_string(), Value::String(timestamp()));
            }
            if !entry.contains_key("log.level") {
                entry.insert(
                    "log.level".to_string(),
                    Value::String(self.settings.log_level.to_lowercase()),
                );
            }
            serde_json::to_string(&Value::Object(entry)).map_err(TranscodeError::JsonMarshal)
        } else {
            Ok(format_as_simple_string(entry))
        }
    }

    fn add_standard_fields(&self, entry: &mut Map<String, Value>) {
        entry.insert("@timestamp".to_string(), Value::String(timestamp()));
        entry.insert("ecs.version".to_string(), Value::String("8.4".to_string()));
        entry.insert(
            "event.action".to_string(),
            Value::String(self.id().to_string()),
        );
        entry.insert("event.kind".to_string(), Value::String("event".to_string()));
    }
}

impl Activity for DynamicLog {
    fn id(&self) -> &'static str {
        "dynamic-log"
    }

    fn eval(&self, ctx: &mut dyn ActivityContext) -> Result<bool> {
        let Some(Value::Object(log_object)) = ctx.get_input(IV_LOG_OBJECT) else {
            warn!("input 'logObject' is empty; nothing to log");
            return Ok(true);
        };

        let message = self.render(log_object)?;
        match self.settings.log_level.to_uppercase().as_str() {
            "DEBUG" => debug!("{}", message),
            "ERROR" => error!("{}", message),
            "WARN" => warn!("{}", message),
            "INFO" => info!("{}", message),
            other => info!("unknown log level '{}', defaulting to INFO: {}", other, message),
        }
        Ok(true)
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Render the entry as a sorted, readable `key="value"` line, leading with
/// the `message` field when present.
fn format_as_simple_string(mut entry: Map<String, Value>) -> String {
    let primary = entry.remove("message").map(|value| scalar_text(&value));

    let mut keys: Vec<String> = entry.keys().cloned().collect();
    keys.sort();
    let parts: Vec<String> = keys
        .iter()
        .map(|key| format!("{}=\"{}\"", key, scalar_text(&entry[key])))
        .collect();

    match primary {
        Some(message) if parts.is_empty() => message,
        Some(message) => format!("{} | {}", message, parts.join(" ")),
        None => parts.join(" "),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::MapContext;
    use serde_json::json;

    #[test]
    fn test_settings_deserialise_from_host_map_with_defaults() {
        let activity =
            DynamicLog::from_settings(&json!({"logLevel": "DEBUG", "logAsJson": true})).unwrap();
        assert_eq!(activity.settings.log_level, "DEBUG");
        assert!(activity.settings.log_as_json);
        assert!(activity.settings.include_flow_info);
    }

    #[test]
    fn test_simple_format_sorts_keys_and_leads_with_message() {
        let activity = DynamicLog::new(LogSettings {
            include_flow_info: false,
            ..LogSettings::default()
        });
        let rendered = activity
            .render(
                json!({"zulu": 1, "message": "it happened", "alpha": "x"})
                    .as_object()
                    .cloned()
                    .unwrap(),
            )
            .unwrap();
        assert_eq!(rendered, "it happened | alpha=\"x\" zulu=\"1\"");
    }

    #[test]
    fn test_json_format_backfills_timestamp_and_level() {
        let activity = DynamicLog::new(LogSettings {
            log_level: "WARN".to_string(),
            log_as_json: true,
            include_flow_info: false,
        });
        let rendered = activity
            .render(json!({"message": "m"}).as_object().cloned().unwrap())
            .unwrap();
        let parsed: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["message"], json!("m"));
        assert_eq!(parsed["log.level"], json!("warn"));
        assert!(parsed.get("@timestamp").is_some());
    }

    #[test]
    fn test_flow_info_adds_standard_fields() {
        let activity = DynamicLog::new(LogSettings {
            log_as_json: true,
            ..LogSettings::default()
        });
        let rendered = activity
            .render(json!({"message": "m"}).as_object().cloned().unwrap())
            .unwrap();
        let parsed: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["ecs.version"], json!("8.4"));
        assert_eq!(parsed["event.action"], json!("dynamic-log"));
        assert_eq!(parsed["event.kind"], json!("event"));
    }

    #[test]
    fn test_empty_log_object_completes_without_outputs() {
        let mut ctx = MapContext::default();
        assert!(DynamicLog::default().eval(&mut ctx).unwrap());
        assert!(ctx.output("error").is_none());
    }
}
