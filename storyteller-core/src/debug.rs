//! Verbose diagnostic logging of node inputs and outputs.
//!
//! Payloads are logged at `debug` level as pretty JSON with long strings cut
//! down so a story does not flood the terminal.

use serde::Serialize;
use serde_json::Value;

/// Strings longer than this many characters are shortened.
pub const SHORTEN_LIMIT: usize = 240;

/// Shorten every string in `value` longer than `limit` characters to its
/// first `limit` characters followed by `…`, descending into arrays and objects.
pub fn shorten(value: Value, limit: usize) -> Value {
    match value {
        Value::String(s) if s.chars().count() > limit => {
            let mut cut: String = s.chars().take(limit).collect();
            cut.push('…');
            Value::String(cut)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(|v| shorten(v, limit)).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, shorten(v, limit)))
                .collect(),
        ),
        other => other,
    }
}

/// Log `payload` for `node` under `label` (e.g. "input_state", "output_delta").
pub fn debug_log(node: &str, label: &str, payload: &impl Serialize) {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }
    let rendered = serde_json::to_value(payload)
        .map(|v| shorten(v, SHORTEN_LIMIT))
        .and_then(|v| serde_json::to_string_pretty(&v));
    match rendered {
        Ok(json) => tracing::debug!(node, label, "\n{json}"),
        Err(e) => tracing::debug!(node, label, error = %e, "payload not serializable"),
    }
}
