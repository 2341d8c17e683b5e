use crate::utils::{is_truthy, json_text};
use serde_json::Value;

pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to submit form. Please try again.";

/// Banner text for a non-success response from `/api/submit`.
///
/// `result` is the parsed body, or `{}` when the body was empty or not JSON.
pub fn error_message(result: &Value) -> String {
    if let Some(message) = result.get("message").filter(|v| is_truthy(v)) {
        return match message {
            Value::String(s) => s.clone(),
            Value::Object(_) | Value::Array(_) => message
                .get("message")
                .and_then(Value::as_str)
                .filter(|nested| !nested.is_empty())
                .map(str::to_owned)
                .unwrap_or_else(|| message.to_string()),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        };
    }
    if let Some(error) = result.get("error").filter(|v| is_truthy(v)) {
        return match error.as_str() {
            Some(error) => error.to_string(),
            None => "An error occurred".to_string(),
        };
    }
    if let Some(missing) = result.get("missing_fields").filter(|v| is_truthy(v)) {
        let missing = match missing {
            Value::Array(fields) => fields.iter().map(json_text).collect::<Vec<_>>().join(", "),
            other => json_text(other),
        };
        return format!("Missing required fields: {}", missing);
    }
    GENERIC_FAILURE_MESSAGE.to_string()
}
