//! Format detection
//!
//! Classification is a priority chain, the first matching shape wins.

use super::FormatTag;
use super::foreign::is_foreign;
use serde_json::{Map, Value};
use tracing::debug;

/// Classify an arbitrary parsed JSON value
pub fn detect(value: &Value) -> FormatTag {
    let tag = classify(value);
    debug!("Detected export format: {}", tag);
    tag
}

fn classify(value: &Value) -> FormatTag {
    if is_foreign(value) {
        return FormatTag::Foreign;
    }

    match value {
        Value::Array(_) => FormatTag::V1,
        Value::Object(obj) => {
            if is_v2(obj) {
                FormatTag::V2
            } else if has_version(obj, 3) {
                FormatTag::V3
            } else if has_version(obj, 4) {
                FormatTag::V4
            } else {
                FormatTag::Unrecognized
            }
        }
        _ => FormatTag::Unrecognized,
    }
}

fn is_v2(obj: &Map<String, Value>) -> bool {
    !obj.contains_key("version") && obj.contains_key("history") && obj.contains_key("folders")
}

/// Numeric equality, so `4` and `4.0` both count but `"4"` does not
fn has_version(obj: &Map<String, Value>, version: u64) -> bool {
    obj.get("version")
        .and_then(Value::as_f64)
        .is_some_and(|v| v == version as f64)
}
